// tests/api_limiter/cleanup_tests.rs

#[cfg(test)]
mod tests {
    use crate::fixtures::test_clock::TestClock;
    use api_limiter::{ApiConfig, ApiLimiter, ApiLimiterError};
    use std::time::Duration;

    #[test]
    fn cleanup_removes_expired_windows_across_apis() {
        let clock = TestClock::new();
        let limiter = ApiLimiter::with_clock(clock.clone());
        limiter.register_apis([
            ApiConfig::with_limits("pay", 5, Duration::from_millis(1000), "alice"),
            ApiConfig::with_limits("pay", 5, Duration::from_millis(1000), "bob"),
            ApiConfig::new("search").window(Duration::from_millis(5000)),
        ]);

        assert!(limiter.consume_as("pay", "alice").unwrap());
        assert!(limiter.consume("search").unwrap());
        clock.advance_millis(700);
        assert!(limiter.consume_as("pay", "bob").unwrap());

        // alice's window expired at t=1000, bob's has not
        clock.set_millis(1200);
        assert_eq!(limiter.cleanup_expired_clients().unwrap(), 1);

        let alice = limiter.resolve("pay", "alice").unwrap();
        let bob = limiter.resolve("pay", "bob").unwrap();
        assert_eq!(alice.tracked_clients(), 0);
        assert_eq!(bob.tracked_clients(), 1);
        assert_eq!(limiter.resolve("search", None).unwrap().tracked_clients(), 1);
    }

    #[test]
    fn cleanup_does_not_change_decisions() {
        let clock = TestClock::new();
        let limiter = ApiLimiter::with_clock(clock.clone());
        limiter.register_apis([ApiConfig::with_limits(
            "pay",
            1,
            Duration::from_millis(1000),
            "alice",
        )]);

        assert!(limiter.consume_as("pay", "alice").unwrap());
        assert_eq!(limiter.cleanup_expired_clients().unwrap(), 0);
        assert!(!limiter.consume_as("pay", "alice").unwrap());

        clock.advance_millis(2000);
        assert_eq!(limiter.cleanup_expired_clients().unwrap(), 1);
        assert!(limiter.consume_as("pay", "alice").unwrap());
    }

    #[test]
    fn cleanup_handles_empty_state() {
        let limiter = ApiLimiter::with_clock(TestClock::new());
        assert_eq!(limiter.cleanup_expired_clients().unwrap(), 0);

        limiter.register_apis([ApiConfig::new("search")]);
        assert_eq!(limiter.cleanup_expired_clients().unwrap(), 0);
    }

    #[test]
    fn cleanup_reports_clock_failure() {
        let clock = TestClock::new();
        let limiter = ApiLimiter::with_clock(clock.clone());
        limiter.register_apis([ApiConfig::new("search")]);
        assert!(limiter.consume("search").unwrap());

        clock.fail_next_call();
        assert!(matches!(
            limiter.cleanup_expired_clients().unwrap_err(),
            ApiLimiterError::Clock(_)
        ));
        assert_eq!(limiter.resolve("search", None).unwrap().tracked_clients(), 1);
    }
}
