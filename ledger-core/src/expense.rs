//! Expense ledger and cost split
//!
//! Shared costs are split in integer currency units. A total that does not
//! divide evenly leaves a remainder smaller than the member count; the first
//! `remainder` members in input order carry one extra unit each, so the
//! shares always add back up to the total.
//!
//! ```text
//! total 10_001, 3 members:
//!   base 3_333, remainder 2
//!   shares: 3_334, 3_334, 3_333  (sum 10_001)
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Amount, Expense, NewExpense};
use crate::{Error, Result};

impl Expense {
    /// Validate caller input and assign a fresh ID
    pub fn record(new: NewExpense) -> Result<Self> {
        if new.amount <= 0 {
            return Err(Error::InvalidAmount(new.amount));
        }

        Ok(Self {
            id: Uuid::now_v7(),
            description: new.description,
            amount: new.amount,
            date: new.date,
            paid_by: new.paid_by,
            receipt_url: new.receipt_url,
        })
    }
}

/// Sum of all expense amounts, saturating at `Amount::MAX`
pub fn total_expenses<'a>(expenses: impl IntoIterator<Item = &'a Expense>) -> Amount {
    expenses
        .into_iter()
        .fold(0, |acc: Amount, e| acc.saturating_add(e.amount))
}

/// Exact sum of all expense amounts; `InvalidAmount` on overflow
pub fn checked_total_expenses<'a>(expenses: impl IntoIterator<Item = &'a Expense>) -> Result<Amount> {
    expenses.into_iter().try_fold(0 as Amount, |acc, e| {
        acc.checked_add(e.amount).ok_or(Error::InvalidAmount(e.amount))
    })
}

/// Even cost per member, rounded down; 0 without members
pub fn cost_per_member(total: Amount, member_count: usize) -> Amount {
    CostSplit::new(total, member_count).base_share
}

/// Result of splitting a total across members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostSplit {
    /// Total being split
    pub total: Amount,

    /// Number of members sharing it
    pub member_count: usize,

    /// Share every member carries
    pub base_share: Amount,

    /// Units left after the even split; go to the first members in order
    pub remainder: Amount,
}

impl CostSplit {
    /// Split `total` across `member_count` members
    pub fn new(total: Amount, member_count: usize) -> Self {
        if member_count == 0 {
            return Self {
                total,
                member_count,
                base_share: 0,
                remainder: 0,
            };
        }

        let n = member_count as Amount;
        Self {
            total,
            member_count,
            base_share: total.div_euclid(n),
            remainder: total.rem_euclid(n),
        }
    }

    /// Share of the member at `index` in input order
    pub fn share_for(&self, index: usize) -> Amount {
        if index >= self.member_count {
            return 0;
        }
        if (index as Amount) < self.remainder {
            self.base_share + 1
        } else {
            self.base_share
        }
    }

    /// Exact average share for display, two decimal places
    pub fn average_share(&self) -> Decimal {
        if self.member_count == 0 {
            return Decimal::ZERO;
        }
        (Decimal::from(self.total) / Decimal::from(self.member_count as u64)).round_dp(2)
    }

    /// Sum of all shares; equals `total` whenever there is at least one member
    pub fn allocated(&self) -> Amount {
        (0..self.member_count).map(|i| self.share_for(i)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MemberId;
    use chrono::NaiveDate;

    fn new_expense(amount: Amount) -> NewExpense {
        NewExpense {
            description: "study room".to_string(),
            amount,
            date: NaiveDate::from_ymd_opt(2024, 7, 15).unwrap(),
            paid_by: MemberId::new("1"),
            receipt_url: None,
        }
    }

    #[test]
    fn test_record_rejects_non_positive() {
        assert!(matches!(Expense::record(new_expense(0)), Err(Error::InvalidAmount(0))));
        assert!(matches!(Expense::record(new_expense(-500)), Err(Error::InvalidAmount(-500))));
    }

    #[test]
    fn test_record_assigns_unique_ids() {
        let a = Expense::record(new_expense(25_000)).unwrap();
        let b = Expense::record(new_expense(18_500)).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(total_expenses(&[a, b]), 43_500);
    }

    #[test]
    fn test_even_split() {
        let split = CostSplit::new(10_000, 2);
        assert_eq!(split.base_share, 5_000);
        assert_eq!(split.remainder, 0);
        assert_eq!(split.share_for(0), 5_000);
        assert_eq!(split.share_for(1), 5_000);
        assert_eq!(cost_per_member(10_000, 2), 5_000);
    }

    #[test]
    fn test_remainder_goes_to_first_members() {
        let split = CostSplit::new(10_001, 3);
        assert_eq!(split.base_share, 3_333);
        assert_eq!(split.remainder, 2);
        assert_eq!(split.share_for(0), 3_334);
        assert_eq!(split.share_for(1), 3_334);
        assert_eq!(split.share_for(2), 3_333);
        assert_eq!(split.allocated(), 10_001);
        assert_eq!(split.average_share(), Decimal::new(333367, 2));
    }

    #[test]
    fn test_zero_members() {
        let split = CostSplit::new(43_500, 0);
        assert_eq!(split.base_share, 0);
        assert_eq!(split.share_for(0), 0);
        assert_eq!(split.average_share(), Decimal::ZERO);
        assert_eq!(cost_per_member(43_500, 0), 0);
    }
}
