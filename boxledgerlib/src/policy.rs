//! Commercial policy constants applied to every statement.

use serde::{Deserialize, Serialize};

use crate::error::{FieldErrors, Result};

pub const AC_CHARGE_PER_TICKET: i64 = 5;
pub const DISTRIBUTOR_SHARE_PERCENT: u8 = 60;
pub const MAX_RANGE_DAYS: i64 = 90;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Policy {
    /// Rupees deducted from gross per ticket sold.
    pub ac_charge_per_ticket: i64,
    /// The exhibitor receives the rest of net collection.
    pub distributor_share_percent: u8,
    /// Longest allowed `end - start`, in days.
    pub max_range_days: i64,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            ac_charge_per_ticket: AC_CHARGE_PER_TICKET,
            distributor_share_percent: DISTRIBUTOR_SHARE_PERCENT,
            max_range_days: MAX_RANGE_DAYS,
        }
    }
}

impl Policy {
    pub const fn exhibitor_share_percent(&self) -> u8 {
        100u8.saturating_sub(self.distributor_share_percent)
    }

    /// Rejects values loaded from settings that would break the share split
    /// or the range check.
    pub fn check(&self) -> Result<()> {
        let mut errors = FieldErrors::default();
        if self.ac_charge_per_ticket < 0 {
            errors.push("ac_charge_per_ticket", "AC charge cannot be negative");
        }
        if self.distributor_share_percent > 100 {
            errors.push(
                "distributor_share_percent",
                "Distributor share cannot exceed 100%",
            );
        }
        if self.max_range_days < 0 {
            errors.push("max_range_days", "Maximum range cannot be negative");
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_split_is_sixty_forty() {
        let p = Policy::default();
        assert_eq!(p.distributor_share_percent, 60);
        assert_eq!(p.exhibitor_share_percent(), 40);
        assert!(p.check().is_ok());
    }

    #[test]
    fn share_over_hundred_is_rejected() {
        let p = Policy {
            distributor_share_percent: 120,
            ..Policy::default()
        };
        assert!(p.check().is_err());
    }
}
