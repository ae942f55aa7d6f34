//! Settlement periods
//!
//! A period moves `Open -> Sealed` exactly once. Sessions and expenses are
//! only ever written to an open period; a sealed period is history.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::expense::{checked_total_expenses, total_expenses};
use crate::types::{Amount, AttendanceStatus, Expense, MemberId, NewExpense, Session};
use crate::{Error, Result};

/// A window of sessions and expenses closed together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementPeriod {
    /// Period ID
    pub id: Uuid,

    /// Display name, e.g. "2024년 8월"
    pub name: String,

    /// First day of the period
    pub start_date: NaiveDate,

    /// Set when the period is sealed
    pub end_date: Option<DateTime<Utc>>,

    /// Sessions, in creation order
    pub sessions: Vec<Session>,

    /// Expenses, in creation order
    pub expenses: Vec<Expense>,

    /// Sealed flag; never reset once true
    pub is_settled: bool,
}

/// Display name of the month containing `date`
pub fn period_name(date: NaiveDate) -> String {
    format!("{}년 {}월", date.year(), date.month())
}

/// First day of the month after `date`
pub fn next_month_start(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    // Day 1 exists in every month
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

/// First day of the month containing `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

impl SettlementPeriod {
    /// New open period with no sessions or expenses
    pub fn open(name: impl Into<String>, start_date: NaiveDate) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            start_date,
            end_date: None,
            sessions: Vec::new(),
            expenses: Vec::new(),
            is_settled: false,
        }
    }

    /// Open period for the month containing `date`, starting on its first day
    pub fn for_month_of(date: NaiveDate) -> Self {
        Self::open(period_name(date), month_start(date))
    }

    /// Open period for the month after `now`
    pub fn successor_of(now: DateTime<Utc>) -> Self {
        let start = next_month_start(now.date_naive());
        Self::open(period_name(start), start)
    }

    /// Fails with `InvalidState` once sealed
    pub fn ensure_open(&self) -> Result<()> {
        if self.is_settled {
            return Err(Error::InvalidState(format!(
                "period {} ({}) is sealed",
                self.name, self.id
            )));
        }
        Ok(())
    }

    /// Seal the period at `now`
    pub fn seal(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.ensure_open()?;
        self.is_settled = true;
        self.end_date = Some(now);
        Ok(())
    }

    /// Append a session
    pub fn add_session(&mut self, session: Session) -> Result<Uuid> {
        self.ensure_open()?;
        let id = session.id;
        self.sessions.push(session);
        Ok(id)
    }

    /// Overwrite one attendance record
    pub fn set_attendance(
        &mut self,
        session_id: Uuid,
        member_id: &MemberId,
        status: AttendanceStatus,
    ) -> Result<()> {
        self.ensure_open()?;
        self.sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(|| Error::not_found("session", session_id))?
            .set_status(member_id, status)
    }

    /// Validate and append an expense
    pub fn add_expense(&mut self, new: NewExpense) -> Result<Uuid> {
        self.ensure_open()?;
        let expense = Expense::record(new)?;
        // The period total must stay representable
        checked_total_expenses(&self.expenses)?
            .checked_add(expense.amount)
            .ok_or(Error::InvalidAmount(expense.amount))?;
        let id = expense.id;
        self.expenses.push(expense);
        Ok(id)
    }

    /// Session by ID
    pub fn session(&self, session_id: Uuid) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == session_id)
    }

    /// Sessions with no `Pending` record left
    pub fn finalized_sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions.iter().filter(|s| s.is_finalized())
    }

    /// Sum of expenses in this period
    pub fn total_expenses(&self) -> Amount {
        total_expenses(&self.expenses)
    }

    /// Sum of expenses; `InvalidAmount` if it leaves the `Amount` range
    pub fn checked_total_expenses(&self) -> Result<Amount> {
        checked_total_expenses(&self.expenses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expense(amount: Amount) -> NewExpense {
        NewExpense {
            description: "snacks".to_string(),
            amount,
            date: date(2024, 7, 22),
            paid_by: MemberId::new("2"),
            receipt_url: Some("https://example.com/r/2".to_string()),
        }
    }

    #[test]
    fn test_month_arithmetic() {
        assert_eq!(next_month_start(date(2024, 7, 29)), date(2024, 8, 1));
        assert_eq!(next_month_start(date(2024, 12, 31)), date(2025, 1, 1));
        assert_eq!(month_start(date(2024, 2, 29)), date(2024, 2, 1));
        assert_eq!(period_name(date(2024, 8, 1)), "2024년 8월");
    }

    #[test]
    fn test_successor_naming() {
        let now = Utc.with_ymd_and_hms(2024, 12, 20, 9, 0, 0).unwrap();
        let next = SettlementPeriod::successor_of(now);
        assert_eq!(next.name, "2025년 1월");
        assert_eq!(next.start_date, date(2025, 1, 1));
        assert!(!next.is_settled);
        assert!(next.sessions.is_empty() && next.expenses.is_empty());
    }

    #[test]
    fn test_seal_is_terminal() {
        let mut period = SettlementPeriod::for_month_of(date(2024, 7, 10));
        let now = Utc.with_ymd_and_hms(2024, 7, 31, 21, 0, 0).unwrap();

        period.seal(now).unwrap();
        assert!(period.is_settled);
        assert_eq!(period.end_date, Some(now));

        assert!(period.seal(now).unwrap_err().is_invalid_state());
        assert!(period.add_expense(expense(1_000)).unwrap_err().is_invalid_state());
        let session = Session::new(date(2024, 8, 5), "late entry", &[MemberId::new("1")]);
        assert!(period.add_session(session).unwrap_err().is_invalid_state());
    }

    #[test]
    fn test_set_attendance_unknown_session() {
        let mut period = SettlementPeriod::for_month_of(date(2024, 7, 10));
        let err = period
            .set_attendance(Uuid::now_v7(), &MemberId::new("1"), AttendanceStatus::Late)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_finalized_sessions_and_totals() {
        let mut period = SettlementPeriod::for_month_of(date(2024, 7, 10));
        let members = [MemberId::new("1"), MemberId::new("2")];

        let done = period.add_session(Session::new(date(2024, 7, 15), "kickoff", &members)).unwrap();
        period.add_session(Session::new(date(2024, 7, 22), "design", &members)).unwrap();
        period.set_attendance(done, &members[0], AttendanceStatus::Present).unwrap();
        period.set_attendance(done, &members[1], AttendanceStatus::Late).unwrap();

        assert_eq!(period.finalized_sessions().count(), 1);

        period.add_expense(expense(25_000)).unwrap();
        period.add_expense(expense(18_500)).unwrap();
        assert!(period.add_expense(expense(0)).is_err());
        assert_eq!(period.total_expenses(), 43_500);
        assert_eq!(period.expenses.len(), 2);
    }

    #[test]
    fn test_expense_total_cannot_overflow() {
        let mut period = SettlementPeriod::for_month_of(date(2024, 7, 10));
        period.add_expense(expense(Amount::MAX)).unwrap();

        let err = period.add_expense(expense(1)).unwrap_err();
        assert!(matches!(err, Error::InvalidAmount(1)));
        assert_eq!(period.expenses.len(), 1);
        assert_eq!(period.checked_total_expenses().unwrap(), Amount::MAX);
    }
}
