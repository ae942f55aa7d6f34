//! Attendance statistics and member ranking

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::attendance::fine_for;
use crate::types::{Amount, AttendanceStatus, Member, MemberId, Rules, Session};

/// Attendance record of one member across sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberStats {
    /// Member ID
    pub member_id: MemberId,

    /// Display name
    pub name: String,

    /// Sessions attended on time
    pub present: u32,

    /// Sessions attended late
    pub late: u32,

    /// Sessions missed
    pub absent: u32,

    /// Fines under the current rules
    pub total_fines: Amount,

    /// Percentage of finalized sessions attended, one decimal place
    pub attendance_rate: Decimal,
}

impl MemberStats {
    /// Tally one member over `sessions`
    pub fn collect<'a>(
        member: &Member,
        sessions: impl IntoIterator<Item = &'a Session>,
        rules: &Rules,
    ) -> Self {
        let mut stats = Self {
            member_id: member.id.clone(),
            name: member.name.clone(),
            present: 0,
            late: 0,
            absent: 0,
            total_fines: 0,
            attendance_rate: Decimal::ONE_HUNDRED,
        };

        for record in sessions.into_iter().filter_map(|s| s.record_for(&member.id)) {
            match record.status {
                AttendanceStatus::Present => stats.present += 1,
                AttendanceStatus::Late => stats.late += 1,
                AttendanceStatus::Absent => stats.absent += 1,
                AttendanceStatus::Pending => {}
            }
            stats.total_fines = stats.total_fines.saturating_add(fine_for(record.status, rules));
        }

        stats.attendance_rate = stats.exact_rate().round_dp(1);
        stats
    }

    /// Unrounded attendance percentage; 100 with nothing finalized
    fn exact_rate(&self) -> Decimal {
        let attended = self.present + self.late;
        let counted = attended + self.absent;
        if counted == 0 {
            return Decimal::ONE_HUNDRED;
        }
        Decimal::from(attended) * Decimal::ONE_HUNDRED / Decimal::from(counted)
    }
}

/// Stats for every member, best first: rate descending, then fines ascending
pub fn ranking(members: &[Member], sessions: &[Session], rules: &Rules) -> Vec<MemberStats> {
    let mut stats: Vec<MemberStats> = members
        .iter()
        .map(|m| MemberStats::collect(m, sessions, rules))
        .collect();

    // Rounding is for display only; two rates in the same 0.1 bucket still order
    stats.sort_by(|a, b| {
        b.exact_rate()
            .cmp(&a.exact_rate())
            .then(a.total_fines.cmp(&b.total_fines))
    });
    stats
}

/// Head of the ranking
pub fn best_member(ranked: &[MemberStats]) -> Option<&MemberStats> {
    ranked.first()
}

/// Member with the most late arrivals (ties: more fines); none if nobody was late
pub fn late_king(ranked: &[MemberStats]) -> Option<&MemberStats> {
    ranked
        .iter()
        .fold(None, |best: Option<&MemberStats>, s| match best {
            Some(b) if (b.late, b.total_fines) >= (s.late, s.total_fines) => Some(b),
            _ => Some(s),
        })
        .filter(|s| s.late > 0)
}

/// First session still waiting for attendance
pub fn next_session<'a>(sessions: impl IntoIterator<Item = &'a Session>) -> Option<&'a Session> {
    sessions.into_iter().find(|s| s.has_pending())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn members() -> Vec<Member> {
        vec![
            Member::new("1", "Minjun"),
            Member::new("2", "Seoyeon"),
            Member::new("3", "Doyun"),
        ]
    }

    fn session(day: u32, statuses: [AttendanceStatus; 3]) -> Session {
        let ids: Vec<MemberId> = members().into_iter().map(|m| m.id).collect();
        let mut s = Session::new(NaiveDate::from_ymd_opt(2024, 7, day).unwrap(), "weekly", &ids);
        for (id, status) in ids.iter().zip(statuses) {
            s.set_status(id, status).unwrap();
        }
        s
    }

    #[test]
    fn test_collect_and_rate() {
        use AttendanceStatus::*;
        let sessions = vec![
            session(15, [Present, Late, Absent]),
            session(22, [Present, Late, Present]),
            session(29, [Pending, Pending, Pending]),
        ];
        let rules = Rules::default();

        let doyun = MemberStats::collect(&members()[2], &sessions, &rules);
        assert_eq!((doyun.present, doyun.late, doyun.absent), (1, 0, 1));
        assert_eq!(doyun.total_fines, 5_000);
        assert_eq!(doyun.attendance_rate, Decimal::new(500, 1));

        let fresh = MemberStats::collect(&Member::new("9", "New"), &sessions, &rules);
        assert_eq!(fresh.attendance_rate, Decimal::ONE_HUNDRED);
    }

    #[test]
    fn test_ranking_order() {
        use AttendanceStatus::*;
        let sessions = vec![
            session(15, [Present, Late, Absent]),
            session(22, [Present, Late, Absent]),
            session(29, [Absent, Present, Present]),
        ];
        let ranked = ranking(&members(), &sessions, &Rules::default());

        // Seoyeon 100% with 6000 fines, Minjun 66.7%, Doyun 33.3%
        assert_eq!(ranked[0].name, "Seoyeon");
        assert_eq!(ranked[1].attendance_rate, Decimal::new(667, 1));
        assert_eq!(best_member(&ranked).unwrap().name, "Seoyeon");
        assert_eq!(late_king(&ranked).unwrap().name, "Seoyeon");
    }

    #[test]
    fn test_ranking_uses_unrounded_rate() {
        use AttendanceStatus::*;
        let early = Member::new("e", "Early");
        let steady = Member::new("s", "Steady");
        let both = [early.id.clone(), steady.id.clone()];
        let day = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();

        // Early: 23 of 28 attended, all late (82.14%)
        // Steady: 32 of 39 attended, all present (82.05%)
        let mut sessions = Vec::new();
        for i in 0..39 {
            let ids = if i < 28 { &both[..] } else { &both[1..] };
            let mut s = Session::new(day, "weekly", ids);
            if i < 28 {
                s.set_status(&early.id, if i < 23 { Late } else { Absent }).unwrap();
            }
            s.set_status(&steady.id, if i < 32 { Present } else { Absent }).unwrap();
            sessions.push(s);
        }

        let ranked = ranking(&[steady, early], &sessions, &Rules::default());
        assert_eq!(ranked[0].attendance_rate, ranked[1].attendance_rate);
        assert!(ranked[0].total_fines > ranked[1].total_fines);
        assert_eq!(ranked[0].name, "Early");
    }

    #[test]
    fn test_no_late_king_without_lates() {
        use AttendanceStatus::*;
        let sessions = vec![session(15, [Present, Present, Absent])];
        let ranked = ranking(&members(), &sessions, &Rules::default());
        assert!(late_king(&ranked).is_none());
    }

    #[test]
    fn test_next_session() {
        use AttendanceStatus::*;
        let sessions = vec![
            session(15, [Present, Present, Present]),
            session(22, [Present, Pending, Present]),
        ];
        assert_eq!(
            next_session(&sessions).unwrap().date,
            NaiveDate::from_ymd_opt(2024, 7, 22).unwrap()
        );
    }
}
