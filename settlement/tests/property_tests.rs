//! Property-based tests for settlement invariants
//!
//! These tests use proptest to verify:
//! - At most one open period, whatever the settle sequence
//! - Cost shares add back up to the total
//! - Fines are a pure function of status and rules
//! - Sessions with a pending record never contribute fines

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use moim_ledger::{
    fine_for, AttendanceStatus, CostSplit, Member, MemberId, NewExpense, Rules,
};
use moim_settlement::{Group, SettlementEngine};
use proptest::prelude::*;

/// Strategy for generating attendance statuses
fn status_strategy() -> impl Strategy<Value = AttendanceStatus> {
    prop_oneof![
        Just(AttendanceStatus::Present),
        Just(AttendanceStatus::Late),
        Just(AttendanceStatus::Absent),
        Just(AttendanceStatus::Pending),
    ]
}

/// Strategy for generating rules
fn rules_strategy() -> impl Strategy<Value = Rules> {
    (0i64..100_000, 0i64..10_000, 0i64..10_000)
        .prop_map(|(deposit, late, absent)| Rules::new(deposit, late, absent))
}

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// Group with `n` members (the leader included)
fn group_with(n: usize, rules: Rules) -> Group {
    let mut g = Group::new("Prop", "", rules, Member::new("m0", "Leader"), start()).unwrap();
    for i in 1..n {
        let id = format!("m{}", i);
        g.request_join(Member::new(id.as_str(), id.clone())).unwrap();
        g.approve_member(&MemberId::new(id)).unwrap();
    }
    g
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: shares always sum to the total and differ by at most one
    #[test]
    fn prop_split_conserves_total(total in 1i64..10_000_000, n in 1usize..50) {
        let split = CostSplit::new(total, n);
        prop_assert_eq!(split.allocated(), total);

        let max = (0..n).map(|i| split.share_for(i)).max().unwrap();
        let min = (0..n).map(|i| split.share_for(i)).min().unwrap();
        prop_assert!(max - min <= 1);
    }

    /// Property: fine depends only on status and rules
    #[test]
    fn prop_fine_is_pure(status in status_strategy(), rules in rules_strategy()) {
        prop_assert_eq!(fine_for(status, &rules), fine_for(status, &rules));
        if matches!(status, AttendanceStatus::Present | AttendanceStatus::Pending) {
            prop_assert_eq!(fine_for(status, &rules), 0);
        }
    }

    /// Property: any sequence of settlements leaves exactly one open period
    /// and every sealed period carries an end date
    #[test]
    fn prop_single_open_period(settles in 1usize..8, members in 1usize..6) {
        let mut g = group_with(members, Rules::default());
        let engine = SettlementEngine::default();
        let base = Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap();

        for i in 0..settles {
            let now = base + Duration::days(31 * i as i64);
            prop_assert!(g.settle(&engine, now).unwrap().is_some());
            prop_assert_eq!(g.periods().iter().filter(|p| !p.is_settled).count(), 1);
        }

        prop_assert_eq!(g.periods().len(), settles + 1);
        prop_assert!(g.periods().iter().filter(|p| p.is_settled).all(|p| p.end_date.is_some()));
    }

    /// Property: a session with any pending record adds no fines, and the
    /// balance change equals fines plus cost share for every member
    #[test]
    fn prop_settlement_balances(
        statuses in proptest::collection::vec(
            proptest::collection::vec(status_strategy(), 3),
            0..6,
        ),
        amounts in proptest::collection::vec(1i64..100_000, 0..5),
        rules in rules_strategy(),
    ) {
        let mut g = group_with(3, rules);
        let ids: Vec<MemberId> = g.members().iter().map(|m| m.id.clone()).collect();

        let mut expected_fines = vec![0i64; 3];
        for (week, row) in statuses.iter().enumerate() {
            let sid = g.add_session(start() + Duration::days(7 * week as i64), "weekly").unwrap();
            for (id, status) in ids.iter().zip(row) {
                g.update_attendance(sid, id, *status).unwrap();
            }
            if row.iter().all(|s| s.is_finalized()) {
                for (i, status) in row.iter().enumerate() {
                    expected_fines[i] += fine_for(*status, &rules);
                }
            }
        }
        for amount in &amounts {
            g.add_expense(NewExpense {
                description: "shared".to_string(),
                amount: *amount,
                date: start(),
                paid_by: ids[0].clone(),
                receipt_url: None,
            })
            .unwrap();
        }

        let before: Vec<i64> = g.members().iter().map(|m| m.balance).collect();
        let now = Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap();
        let outcome = g.settle(&SettlementEngine::default(), now).unwrap().unwrap();

        let total: i64 = amounts.iter().sum();
        prop_assert_eq!(outcome.total_expenses, total);
        prop_assert_eq!(outcome.lines.iter().map(|l| l.cost_share).sum::<i64>(), total);

        for (i, line) in outcome.lines.iter().enumerate() {
            prop_assert_eq!(line.fines, expected_fines[i]);
            prop_assert_eq!(line.starting_balance, before[i]);
            prop_assert_eq!(g.members()[i].balance, before[i] - line.fines - line.cost_share);
        }
    }
}
