//! Core types for the settlement engine

use chrono::{DateTime, Utc};
use moim_ledger::{Amount, CostSplit, Member, MemberId, SettlementPeriod};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One member's line in a settlement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSettlement {
    /// Member ID
    pub member_id: MemberId,

    /// Display name at settlement time
    pub name: String,

    /// Balance before settlement
    pub starting_balance: Amount,

    /// Fines over the finalized sessions of the period
    pub fines: Amount,

    /// This member's share of the period's expenses
    pub cost_share: Amount,

    /// `starting_balance - fines - cost_share`
    pub new_balance: Amount,
}

/// Rendered settlement report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Title, from the settlement year and month
    pub title: String,

    /// Body text
    pub body: String,
}

/// Everything a settlement will change, computed before anything is written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementPlan {
    /// Period being sealed
    pub period_id: Uuid,

    /// Name of the period being sealed
    pub period_name: String,

    /// Settlement time
    pub settled_at: DateTime<Utc>,

    /// Sessions counted for fines
    pub settled_sessions: usize,

    /// Sessions skipped because attendance is still pending
    pub excluded_sessions: usize,

    /// Sum of the period's expenses
    pub total_expenses: Amount,

    /// How the expenses were split
    pub split: CostSplit,

    /// One line per member, in member order
    pub lines: Vec<MemberSettlement>,

    /// Report to publish
    pub report: Report,

    /// Period opened after sealing
    pub successor: SettlementPeriod,
}

impl SettlementPlan {
    /// Balance updates for the membership registry
    pub fn balance_updates(&self) -> Vec<(MemberId, Amount)> {
        self.lines
            .iter()
            .map(|l| (l.member_id.clone(), l.new_balance))
            .collect()
    }

    /// Sum of all fines in the plan, saturating at `Amount::MAX`
    pub fn total_fines(&self) -> Amount {
        self.lines
            .iter()
            .fold(0, |acc: Amount, l| acc.saturating_add(l.fines))
    }
}

/// Result of a completed settlement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementOutcome {
    /// Sealed period
    pub sealed_period_id: Uuid,

    /// Newly opened period
    pub successor_period_id: Uuid,

    /// Announcement carrying the report
    pub announcement_id: Uuid,

    /// Published report
    pub report: Report,

    /// Sum of the period's expenses
    pub total_expenses: Amount,

    /// How the expenses were split
    pub split: CostSplit,

    /// Per-member lines
    pub lines: Vec<MemberSettlement>,
}

/// Member with fines computed live from the current rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberFines {
    /// Member as stored
    pub member: Member,

    /// Derived from the group's leader
    pub is_leader: bool,

    /// Fines across every session of every period
    pub total_fines: Amount,
}

/// Directory listing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    /// Group ID
    pub id: Uuid,

    /// Name
    pub name: String,

    /// One-line description
    pub description: String,
}
