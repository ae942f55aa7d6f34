//! Attendance ledger
//!
//! Fines are derived, never stored: every total is recomputed from the
//! records and the rules passed in, so a rules change shows up on the next
//! read.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::types::{Amount, AttendanceRecord, AttendanceStatus, MemberId, Rules, Session};
use crate::{Error, Result};

/// Fine owed for a single status under `rules`
pub fn fine_for(status: AttendanceStatus, rules: &Rules) -> Amount {
    match status {
        AttendanceStatus::Late => rules.late_fine,
        AttendanceStatus::Absent => rules.absent_fine,
        AttendanceStatus::Present | AttendanceStatus::Pending => 0,
    }
}

/// Sum of fines over every record of every session, saturating at the
/// `Amount` bounds
pub fn total_fines<'a>(sessions: impl IntoIterator<Item = &'a Session>, rules: &Rules) -> Amount {
    sessions
        .into_iter()
        .flat_map(|s| s.attendance.iter())
        .fold(0, |acc: Amount, r| acc.saturating_add(fine_for(r.status, rules)))
}

/// Sum of one member's fines across `sessions`, saturating at the `Amount`
/// bounds
pub fn member_fines<'a>(
    sessions: impl IntoIterator<Item = &'a Session>,
    member_id: &MemberId,
    rules: &Rules,
) -> Amount {
    sessions
        .into_iter()
        .filter_map(|s| s.record_for(member_id))
        .fold(0, |acc: Amount, r| acc.saturating_add(fine_for(r.status, rules)))
}

/// Exact sum of one member's fines; `InvalidAmount` if it leaves the
/// `Amount` range
pub fn checked_member_fines<'a>(
    sessions: impl IntoIterator<Item = &'a Session>,
    member_id: &MemberId,
    rules: &Rules,
) -> Result<Amount> {
    sessions
        .into_iter()
        .filter_map(|s| s.record_for(member_id))
        .try_fold(0 as Amount, |acc, r| {
            let fine = fine_for(r.status, rules);
            acc.checked_add(fine).ok_or(Error::InvalidAmount(fine))
        })
}

impl Session {
    /// New session with a `Pending` record for every member
    pub fn new<'a>(
        date: NaiveDate,
        topic: impl Into<String>,
        members: impl IntoIterator<Item = &'a MemberId>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            date,
            topic: topic.into(),
            attendance: members
                .into_iter()
                .map(|id| AttendanceRecord {
                    member_id: id.clone(),
                    status: AttendanceStatus::Pending,
                })
                .collect(),
        }
    }

    /// A session is finalized once no record is `Pending`
    pub fn is_finalized(&self) -> bool {
        self.attendance.iter().all(|r| r.status.is_finalized())
    }

    /// True while any record is still `Pending`
    pub fn has_pending(&self) -> bool {
        !self.is_finalized()
    }

    /// Record of one member, if they were known when the session was created
    pub fn record_for(&self, member_id: &MemberId) -> Option<&AttendanceRecord> {
        self.attendance.iter().find(|r| &r.member_id == member_id)
    }

    /// Overwrite one member's status
    pub fn set_status(&mut self, member_id: &MemberId, status: AttendanceStatus) -> Result<()> {
        let record = self
            .attendance
            .iter_mut()
            .find(|r| &r.member_id == member_id)
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "attendance record for member {} in session {}",
                    member_id, self.id
                ))
            })?;

        record.status = status;
        Ok(())
    }

    /// Number of records with the given status
    pub fn count(&self, status: AttendanceStatus) -> usize {
        self.attendance.iter().filter(|r| r.status == status).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fine_sums_near_amount_bounds() {
        let id = MemberId::new("1");
        let day = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let rules = Rules::new(0, 1, Amount::MAX);
        let sessions: Vec<Session> = (0..2)
            .map(|_| {
                let mut s = Session::new(day, "weekly", [&id]);
                s.set_status(&id, AttendanceStatus::Absent).unwrap();
                s
            })
            .collect();

        assert_eq!(total_fines(&sessions, &rules), Amount::MAX);
        assert_eq!(member_fines(&sessions, &id, &rules), Amount::MAX);
        assert!(matches!(
            checked_member_fines(&sessions, &id, &rules),
            Err(Error::InvalidAmount(i64::MAX))
        ));
        assert_eq!(checked_member_fines(&sessions[..1], &id, &rules).unwrap(), Amount::MAX);
    }

    fn session(statuses: &[(&str, AttendanceStatus)]) -> Session {
        let ids: Vec<MemberId> = statuses.iter().map(|(id, _)| MemberId::new(*id)).collect();
        let mut s = Session::new(NaiveDate::from_ymd_opt(2024, 7, 15).unwrap(), "planning", &ids);
        for (id, status) in statuses {
            s.set_status(&MemberId::new(*id), *status).unwrap();
        }
        s
    }

    #[test]
    fn test_fine_for() {
        let rules = Rules::new(20_000, 3_000, 5_000);
        assert_eq!(fine_for(AttendanceStatus::Late, &rules), 3_000);
        assert_eq!(fine_for(AttendanceStatus::Absent, &rules), 5_000);
        assert_eq!(fine_for(AttendanceStatus::Present, &rules), 0);
        assert_eq!(fine_for(AttendanceStatus::Pending, &rules), 0);
    }

    #[test]
    fn test_new_session_is_pending() {
        let ids = vec![MemberId::new("1"), MemberId::new("2")];
        let s = Session::new(NaiveDate::from_ymd_opt(2024, 8, 5).unwrap(), "backend", &ids);
        assert_eq!(s.attendance.len(), 2);
        assert_eq!(s.count(AttendanceStatus::Pending), 2);
        assert!(!s.is_finalized());
    }

    #[test]
    fn test_set_status_touches_one_record() {
        let mut s = session(&[("1", AttendanceStatus::Pending), ("2", AttendanceStatus::Pending)]);
        s.set_status(&MemberId::new("2"), AttendanceStatus::Late).unwrap();
        s.set_status(&MemberId::new("2"), AttendanceStatus::Late).unwrap();

        assert_eq!(s.record_for(&MemberId::new("1")).unwrap().status, AttendanceStatus::Pending);
        assert_eq!(s.record_for(&MemberId::new("2")).unwrap().status, AttendanceStatus::Late);
    }

    #[test]
    fn test_set_status_unknown_member() {
        let mut s = session(&[("1", AttendanceStatus::Present)]);
        let err = s.set_status(&MemberId::new("9"), AttendanceStatus::Late).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_totals_follow_rules() {
        let sessions = vec![
            session(&[("1", AttendanceStatus::Late), ("2", AttendanceStatus::Absent)]),
            session(&[("1", AttendanceStatus::Absent), ("2", AttendanceStatus::Present)]),
        ];
        let rules = Rules::new(20_000, 3_000, 5_000);
        assert_eq!(total_fines(&sessions, &rules), 13_000);
        assert_eq!(member_fines(&sessions, &MemberId::new("1"), &rules), 8_000);

        // No caching: new rules, new totals
        let raised = Rules::new(20_000, 4_000, 5_000);
        assert_eq!(total_fines(&sessions, &raised), 14_000);
    }
}
