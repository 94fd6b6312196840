use dao_types::Timestamp;
use serde::{Deserialize, Serialize};

/// A window `[from, to)` during which `reward` is claimable by token holders.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionInterval {
    /// 1-based, in creation order.
    pub id: u64,
    pub reward: u128,
    pub from: Timestamp,
    pub to: Timestamp,
    /// Claimed so far.
    pub paid: u128,
}

impl DistributionInterval {
    pub fn is_active(&self, now: Timestamp) -> bool {
        self.from <= now && now < self.to
    }

    pub fn has_ended(&self, now: Timestamp) -> bool {
        now >= self.to
    }

    /// The instant holder balances are read at: the end of the second before
    /// the interval opened, so transfers in the opening second do not count.
    pub fn snapshot(&self) -> Timestamp {
        Timestamp::new(self.from.as_secs().saturating_sub(1))
    }

    pub fn unclaimed(&self) -> u128 {
        self.reward.saturating_sub(self.paid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_window_is_half_open() {
        let interval = DistributionInterval {
            id: 1,
            reward: 10,
            from: Timestamp::new(100),
            to: Timestamp::new(200),
            paid: 4,
        };
        assert!(!interval.is_active(Timestamp::new(99)));
        assert!(interval.is_active(Timestamp::new(100)));
        assert!(interval.is_active(Timestamp::new(199)));
        assert!(!interval.is_active(Timestamp::new(200)));
        assert!(interval.has_ended(Timestamp::new(200)));
        assert_eq!(interval.snapshot(), Timestamp::new(99));
        assert_eq!(interval.unclaimed(), 6);
    }
}
