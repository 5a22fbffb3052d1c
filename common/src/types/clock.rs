use std::time::{SystemTime, UNIX_EPOCH};

/// Wall clock reading with millisecond resolution, as stamped on device samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Clock(i64);

impl Clock {
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or_default();
        Self(millis)
    }

    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_now() {
        let clock = Clock::now();
        assert!(clock.as_millis() > 0);
    }

    #[test]
    fn test_clock_as_millis() {
        let clock = Clock::from_millis(12345);
        assert_eq!(clock.as_millis(), 12345);
    }

    #[test]
    fn test_clock_now_is_recent() {
        let clock = Clock::now();
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as i64;
        assert!((clock.as_millis() - now).abs() < 1000);
    }
}
