/// Quota accounting types
///
/// The quota decision itself (accept iff `usage_count < monthly_limit`)
/// is folded into the admission transaction as a single conditional update
/// (see [`crate::models::account::Account::consume_quota`]), so it cannot
/// race with concurrent submissions. This module holds the snapshot type
/// that the admission and usage paths hand back to callers.

use serde::Serialize;
use std::fmt;

/// Point-in-time view of an account's consumption against its limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotaSnapshot {
    /// Jobs admitted so far this billing period
    pub used: i32,

    /// Monthly ceiling
    pub limit: i32,
}

impl QuotaSnapshot {
    /// Creates a snapshot
    pub fn new(used: i32, limit: i32) -> Self {
        QuotaSnapshot { used, limit }
    }

    /// Remaining allowance, never negative
    pub fn remaining(&self) -> i32 {
        (self.limit - self.used).max(0)
    }

    /// Whether another submission would be accepted
    pub fn has_remaining(&self) -> bool {
        self.used < self.limit
    }
}

impl fmt::Display for QuotaSnapshot {
    /// Renders the caller-facing "used/limit" form, e.g. `"3/10"`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.used, self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_display() {
        assert_eq!(QuotaSnapshot::new(0, 10).to_string(), "0/10");
        assert_eq!(QuotaSnapshot::new(1, 10).to_string(), "1/10");
        assert_eq!(QuotaSnapshot::new(100, 100).to_string(), "100/100");
    }

    #[test]
    fn test_snapshot_remaining() {
        assert_eq!(QuotaSnapshot::new(3, 10).remaining(), 7);
        assert_eq!(QuotaSnapshot::new(10, 10).remaining(), 0);
        // Legacy rows can exceed the limit after a plan downgrade
        assert_eq!(QuotaSnapshot::new(12, 10).remaining(), 0);
    }

    #[test]
    fn test_snapshot_has_remaining() {
        assert!(QuotaSnapshot::new(9, 10).has_remaining());
        assert!(!QuotaSnapshot::new(10, 10).has_remaining());
        assert!(!QuotaSnapshot::new(11, 10).has_remaining());
    }
}
