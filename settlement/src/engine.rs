//! Settlement engine
//!
//! Closes the active period of a group in two steps:
//!
//! 1. **Plan**: read-only. Pick the finalized sessions, total the expenses,
//!    split them, compute each member's fines and new balance, render the
//!    report and prepare the successor period.
//! 2. **Apply**: write balances, seal the period, open the successor and
//!    publish the report. The only fallible writes are checked before the
//!    first one lands, so a failed settlement leaves the group untouched.
//!
//! Sessions that still hold a `Pending` record are skipped for fines but
//! stay in the sealed period's history. Money arithmetic is checked: a
//! total or balance that leaves the `i64` range fails the plan with
//! `InvalidAmount` before anything is written.

use chrono::{DateTime, Utc};
use moim_ledger::{
    checked_member_fines, CostSplit, Error as LedgerError, Member, Rules, Session, SettlementPeriod,
};

use crate::{
    config::Config,
    group::Group,
    report::ReportGenerator,
    types::*,
    Result,
};

/// Settlement engine
#[derive(Debug, Clone, Default)]
pub struct SettlementEngine {
    /// Report renderer
    reports: ReportGenerator,
}

impl SettlementEngine {
    /// Create new settlement engine
    pub fn new(reports: ReportGenerator) -> Self {
        Self { reports }
    }

    /// Create from service configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(ReportGenerator::from_config(&config.report))
    }

    /// Compute a settlement without touching any state
    pub fn plan(
        &self,
        period: &SettlementPeriod,
        members: &[Member],
        rules: &Rules,
        now: DateTime<Utc>,
    ) -> Result<SettlementPlan> {
        period.ensure_open()?;

        let settled: Vec<&Session> = period.finalized_sessions().collect();
        let excluded_sessions = period.sessions.len() - settled.len();

        let total_expenses = period.checked_total_expenses()?;
        let split = CostSplit::new(total_expenses, members.len());

        let lines = members
            .iter()
            .enumerate()
            .map(|(i, member)| -> Result<MemberSettlement> {
                let fines = checked_member_fines(settled.iter().copied(), &member.id, rules)?;
                let cost_share = split.share_for(i);
                let new_balance = member
                    .balance
                    .checked_sub(fines)
                    .and_then(|b| b.checked_sub(cost_share))
                    .ok_or(LedgerError::InvalidAmount(fines))?;
                Ok(MemberSettlement {
                    member_id: member.id.clone(),
                    name: member.name.clone(),
                    starting_balance: member.balance,
                    fines,
                    cost_share,
                    new_balance,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let report = self
            .reports
            .render(&period.name, now, &split, excluded_sessions, &lines);

        Ok(SettlementPlan {
            period_id: period.id,
            period_name: period.name.clone(),
            settled_at: now,
            settled_sessions: settled.len(),
            excluded_sessions,
            total_expenses,
            split,
            lines,
            report,
            successor: SettlementPeriod::successor_of(now),
        })
    }

    /// Settle the group's active period
    ///
    /// Returns `Ok(None)` without changing anything when the group has no
    /// open period.
    pub fn settle(&self, group: &mut Group, now: DateTime<Utc>) -> Result<Option<SettlementOutcome>> {
        let idx = match group.active_index()? {
            Some(idx) => idx,
            None => {
                tracing::warn!(group = %group.id(), "settle requested with no active period");
                return Ok(None);
            }
        };

        let plan = self.plan(&group.periods[idx], group.members(), group.rules(), now)?;

        tracing::info!(
            group = %group.id(),
            period = %plan.period_name,
            total_expenses = plan.total_expenses,
            total_fines = plan.total_fines(),
            settled_sessions = plan.settled_sessions,
            excluded_sessions = plan.excluded_sessions,
            "settling period"
        );

        self.apply(group, idx, plan).map(Some)
    }

    fn apply(&self, group: &mut Group, idx: usize, plan: SettlementPlan) -> Result<SettlementOutcome> {
        group.periods[idx].ensure_open()?;

        // Checks every member before writing any balance
        group.members.apply_balances(&plan.balance_updates())?;
        group.periods[idx].seal(plan.settled_at)?;

        let successor_period_id = plan.successor.id;
        tracing::info!(
            group = %group.id(),
            sealed = %plan.period_id,
            opened = %plan.successor.name,
            "period sealed"
        );
        group.periods.push(plan.successor);

        let announcement_id = group.board.post(
            plan.report.title.clone(),
            plan.report.body.clone(),
            plan.settled_at.date_naive(),
            Vec::new(),
        );

        Ok(SettlementOutcome {
            sealed_period_id: plan.period_id,
            successor_period_id,
            announcement_id,
            report: plan.report,
            total_expenses: plan.total_expenses,
            split: plan.split,
            lines: plan.lines,
        })
    }
}
