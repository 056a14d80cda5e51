//! Cache Entry
//!
//! A value plus its write time and absolute expiration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::Value;

/// Current wall-clock time as Unix nanoseconds.
///
/// Every expiry comparison in the crate goes through this clock.
pub fn now_nanos() -> i64 {
    unix_nanos(&Utc::now())
}

/// Unix nanoseconds of `at`, saturating outside the i64 range
/// (1677-09-21 to 2262-04-11). Past the upper bound every expiring entry
/// pins to `i64::MAX` and stays live rather than expiring early.
pub fn unix_nanos(at: &DateTime<Utc>) -> i64 {
    at.timestamp()
        .saturating_mul(1_000_000_000)
        .saturating_add(i64::from(at.timestamp_subsec_nanos()))
}

/// Entry in the store with value and expiration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub value: Value,
    /// Time of the last write
    pub created: DateTime<Utc>,
    /// Absolute expiration in Unix nanoseconds, `<= 0` for never
    pub expiration: i64,
}

impl Entry {
    /// Create an entry expiring `ttl` from now; a zero TTL never expires
    pub fn new(value: Value, ttl: Duration) -> Self {
        let now = Utc::now();
        let expiration = if ttl.is_zero() {
            0
        } else {
            let ttl_nanos = i64::try_from(ttl.as_nanos()).unwrap_or(i64::MAX);
            unix_nanos(&now).saturating_add(ttl_nanos)
        };
        Self {
            value,
            created: now,
            expiration,
        }
    }

    /// Same expiration, new value, fresh write time
    pub fn rewritten(&self, value: Value) -> Self {
        Self {
            value,
            created: Utc::now(),
            expiration: self.expiration,
        }
    }

    pub fn never_expires(&self) -> bool {
        self.expiration <= 0
    }

    /// Check expiry against a caller-supplied clock reading
    #[inline]
    pub fn is_expired_at(&self, now_nanos: i64) -> bool {
        !self.never_expires() && now_nanos > self.expiration
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(now_nanos())
    }

    /// Expiration as a timestamp, `None` for never-expiring entries
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        if self.never_expires() {
            None
        } else {
            Some(DateTime::from_timestamp_nanos(self.expiration))
        }
    }

    /// Time left before expiry (zero once expired), `None` if it never expires
    pub fn ttl_remaining(&self) -> Option<Duration> {
        if self.never_expires() {
            return None;
        }
        let left = self.expiration.saturating_sub(now_nanos()).max(0);
        Some(Duration::from_nanos(left as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_zero_ttl_never_expires() {
        let entry = Entry::new(Value::Int(1), Duration::ZERO);
        assert!(entry.never_expires());
        assert!(!entry.is_expired_at(i64::MAX));
        assert_eq!(entry.expires_at(), None);
        assert_eq!(entry.ttl_remaining(), None);
    }

    #[test]
    fn test_expiration_is_write_time_plus_ttl() {
        let entry = Entry::new(Value::from("v"), Duration::from_secs(60));
        let created = entry.created.timestamp_nanos_opt().unwrap();
        assert_eq!(entry.expiration - created, 60_000_000_000);
        assert!(!entry.is_expired());
        assert!(entry.ttl_remaining().unwrap() <= Duration::from_secs(60));
    }

    #[test]
    fn test_expired_after_ttl() {
        let entry = Entry::new(Value::from("v"), Duration::from_millis(5));
        thread::sleep(Duration::from_millis(15));
        assert!(entry.is_expired());
        assert_eq!(entry.ttl_remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn test_rewritten_keeps_expiration() {
        let entry = Entry::new(Value::Int(1), Duration::from_secs(30));
        thread::sleep(Duration::from_millis(2));
        let next = entry.rewritten(Value::Int(2));
        assert_eq!(next.expiration, entry.expiration);
        assert_eq!(next.value, Value::Int(2));
        assert!(next.created > entry.created);
    }

    #[test]
    fn test_unix_nanos_saturates() {
        let far = DateTime::parse_from_rfc3339("2300-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(unix_nanos(&far), i64::MAX);

        let now = Utc::now();
        assert_eq!(unix_nanos(&now), now.timestamp_nanos_opt().unwrap());

        // An entry written at the saturated clock is not expired at that clock
        let entry = Entry {
            value: Value::Int(1),
            created: far,
            expiration: unix_nanos(&far).saturating_add(1_000),
        };
        assert!(!entry.is_expired_at(unix_nanos(&far)));
    }

    #[test]
    fn test_negative_expiration_means_never() {
        let entry = Entry {
            value: Value::Int(0),
            created: Utc::now(),
            expiration: -5,
        };
        assert!(!entry.is_expired());
    }
}
