//! Group aggregate root
//!
//! A `Group` owns everything one group's treasurer tracks: rules,
//! membership, the period history, the board and the fine vote. Every
//! period-scoped write goes through the active period lookup, never by
//! period ID, so a sealed period cannot be reached for writing.

use chrono::{DateTime, NaiveDate, Utc};
use moim_ledger::{
    board::Board,
    member_fines,
    stats::{self, MemberStats},
    total_fines, Amount, Announcement, Attachment, AttendanceStatus, CostSplit, Error as LedgerError,
    Expense, FineVote, Member, MemberId, MembershipRegistry, NewExpense, Rules, Session,
    SettlementPeriod,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::SettlementEngine;
use crate::types::{GroupSummary, MemberFines, SettlementOutcome};
use crate::Result;

/// Stored state of a group, as handed over by a persistence collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupParts {
    /// Group ID
    pub id: Uuid,
    /// Name
    pub name: String,
    /// Description
    pub description: String,
    /// Rules
    pub rules: Rules,
    /// Members
    pub members: MembershipRegistry,
    /// Period history, oldest first
    pub periods: Vec<SettlementPeriod>,
    /// Board
    pub board: Board,
    /// Fine vote
    pub fine_vote: FineVote,
}

/// One group and all of its ledgers
///
/// At most one period is open. `new`, `restore` and settlement are the only
/// ways periods change, and deserialization goes through `restore`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "GroupParts", into = "GroupParts")]
pub struct Group {
    id: Uuid,
    name: String,
    description: String,
    rules: Rules,
    pub(crate) members: MembershipRegistry,
    pub(crate) periods: Vec<SettlementPeriod>,
    pub(crate) board: Board,
    fine_vote: FineVote,
}

impl Group {
    /// Create a group; the leader joins with the initial deposit and the
    /// first period opens for the month of `today`
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        rules: Rules,
        mut leader: Member,
        today: NaiveDate,
    ) -> Result<Self> {
        rules.validate()?;
        leader.balance = rules.initial_deposit;

        let group = Self {
            id: Uuid::now_v7(),
            name: name.into(),
            description: description.into(),
            rules,
            members: MembershipRegistry::new(leader),
            periods: vec![SettlementPeriod::for_month_of(today)],
            board: Board::new(),
            fine_vote: FineVote::new("", Vec::<String>::new()),
        };
        tracing::info!(group = %group.id, name = %group.name, "group created");
        Ok(group)
    }

    /// Create a group from bootstrap configuration
    pub fn from_config(config: &moim_ledger::Config, today: NaiveDate) -> Result<Self> {
        config.validate()?;
        let leader = Member::new(config.leader.id.as_str(), config.leader.name.clone());
        let mut group = Self::new(
            config.name.clone(),
            config.description.clone(),
            config.rules,
            leader,
            today,
        )?;
        group.fine_vote = FineVote::new(
            config.fine_vote.topic.clone(),
            config.fine_vote.options.iter().cloned(),
        );
        Ok(group)
    }

    /// Rebuild a group from stored parts
    ///
    /// Fails with `InvalidState` when more than one period is open or a
    /// sealed period has no end date. Zero open periods is accepted; such a
    /// group settles as a no-op and rejects period-scoped writes.
    pub fn restore(parts: GroupParts) -> Result<Self> {
        parts.rules.validate()?;
        let open = parts.periods.iter().filter(|p| !p.is_settled).count();
        if open > 1 {
            return Err(LedgerError::InvalidState(format!("{} open periods", open)).into());
        }
        if let Some(p) = parts.periods.iter().find(|p| p.is_settled && p.end_date.is_none()) {
            return Err(LedgerError::InvalidState(format!(
                "sealed period {} has no end date",
                p.id
            ))
            .into());
        }

        Ok(Self {
            id: parts.id,
            name: parts.name,
            description: parts.description,
            rules: parts.rules,
            members: parts.members,
            periods: parts.periods,
            board: parts.board,
            fine_vote: parts.fine_vote,
        })
    }

    /// Split the group back into its stored parts
    pub fn into_parts(self) -> GroupParts {
        GroupParts {
            id: self.id,
            name: self.name,
            description: self.description,
            rules: self.rules,
            members: self.members,
            periods: self.periods,
            board: self.board,
            fine_vote: self.fine_vote,
        }
    }

    // ---------------------------------------------------------------
    // Active period lookup
    // ---------------------------------------------------------------

    /// Index of the open period, `None` if there is none
    pub(crate) fn active_index(&self) -> Result<Option<usize>> {
        let mut open = self
            .periods
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_settled)
            .map(|(i, _)| i);

        let first = open.next();
        if open.next().is_some() {
            return Err(LedgerError::InvalidState("more than one open period".to_string()).into());
        }
        Ok(first)
    }

    fn active_period_mut(&mut self) -> Result<&mut SettlementPeriod> {
        let idx = self
            .active_index()?
            .ok_or_else(|| LedgerError::InvalidState("no active period".to_string()))?;
        Ok(&mut self.periods[idx])
    }

    // ---------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------

    /// Set one member's attendance at a session of the active period
    ///
    /// A session of a sealed period is `InvalidState`; an unknown session is
    /// `NotFound`.
    pub fn update_attendance(
        &mut self,
        session_id: Uuid,
        member_id: &MemberId,
        status: AttendanceStatus,
    ) -> Result<()> {
        if let Some(sealed) = self
            .periods
            .iter()
            .find(|p| p.is_settled && p.session(session_id).is_some())
        {
            return Err(LedgerError::InvalidState(format!(
                "session {} belongs to sealed period {}",
                session_id, sealed.name
            ))
            .into());
        }
        self.active_period_mut()?
            .set_attendance(session_id, member_id, status)?;
        tracing::debug!(session = %session_id, member = %member_id, %status, "attendance updated");
        Ok(())
    }

    /// Record a shared expense in the active period
    pub fn add_expense(&mut self, expense: NewExpense) -> Result<Uuid> {
        let amount = expense.amount;
        let id = self.active_period_mut()?.add_expense(expense)?;
        tracing::debug!(expense = %id, amount, "expense added");
        Ok(id)
    }

    /// Schedule a session in the active period with every current member pending
    pub fn add_session(&mut self, date: NaiveDate, topic: impl Into<String>) -> Result<Uuid> {
        let session = Session::new(date, topic, self.members.ids());
        let id = self.active_period_mut()?.add_session(session)?;
        tracing::debug!(session = %id, %date, "session added");
        Ok(id)
    }

    /// Replace the rules; affects every future computation
    pub fn update_rules(&mut self, rules: Rules) -> Result<()> {
        rules.validate()?;
        tracing::info!(
            group = %self.id,
            initial_deposit = rules.initial_deposit,
            late_fine = rules.late_fine,
            absent_fine = rules.absent_fine,
            "rules updated"
        );
        self.rules = rules;
        Ok(())
    }

    /// Profile edit
    pub fn update_member(&mut self, member_id: &MemberId, name: impl Into<String>) -> Result<()> {
        Ok(self.members.rename(member_id, name)?)
    }

    /// Remove an active member; past periods are untouched
    pub fn remove_member(&mut self, member_id: &MemberId) -> Result<Member> {
        Ok(self.members.remove(member_id)?)
    }

    /// Queue a join request
    pub fn request_join(&mut self, candidate: Member) -> Result<()> {
        Ok(self.members.request_join(candidate)?)
    }

    /// Approve a join request with the current deposit
    pub fn approve_member(&mut self, pending_id: &MemberId) -> Result<Member> {
        Ok(self.members.approve(pending_id, &self.rules)?.clone())
    }

    /// Reject a join request
    pub fn reject_member(&mut self, pending_id: &MemberId) -> Result<Member> {
        Ok(self.members.reject(pending_id)?)
    }

    /// Publish an announcement
    pub fn add_announcement(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
        files: Vec<Attachment>,
        date: NaiveDate,
    ) -> Uuid {
        self.board.post(title, content, date, files)
    }

    /// Cast a vote on how to spend fines
    pub fn add_vote(&mut self, option: &str) -> Result<u32> {
        Ok(self.fine_vote.cast(option)?)
    }

    /// Close the active period; `Ok(None)` when there is none
    pub fn settle(
        &mut self,
        engine: &SettlementEngine,
        now: DateTime<Utc>,
    ) -> Result<Option<SettlementOutcome>> {
        engine.settle(self, now)
    }

    // ---------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------

    /// Group ID
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Directory listing entry
    pub fn summary(&self) -> GroupSummary {
        GroupSummary {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }

    /// Current rules
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Active members
    pub fn members(&self) -> &[Member] {
        self.members.members()
    }

    /// Pending join requests
    pub fn pending_members(&self) -> &[Member] {
        self.members.pending()
    }

    /// Active member by ID
    pub fn member(&self, id: &MemberId) -> Option<&Member> {
        self.members.get(id)
    }

    /// Leadership of `member_id` in this group
    pub fn is_leader(&self, member_id: &MemberId) -> bool {
        self.members.is_leader(member_id)
    }

    /// Period history, oldest first
    pub fn periods(&self) -> &[SettlementPeriod] {
        &self.periods
    }

    /// The open period, if any
    pub fn active_period(&self) -> Option<&SettlementPeriod> {
        self.periods.iter().find(|p| !p.is_settled)
    }

    /// Sessions of the active period
    pub fn active_sessions(&self) -> &[Session] {
        match self.active_period() {
            Some(p) => p.sessions.as_slice(),
            None => &[],
        }
    }

    /// Expenses of the active period
    pub fn active_expenses(&self) -> &[Expense] {
        match self.active_period() {
            Some(p) => p.expenses.as_slice(),
            None => &[],
        }
    }

    /// Every session across all periods, oldest period first
    pub fn all_sessions(&self) -> impl Iterator<Item = &Session> {
        self.periods.iter().flat_map(|p| p.sessions.iter())
    }

    /// Members with fines computed from the current rules over all sessions
    pub fn members_with_fines(&self) -> Vec<MemberFines> {
        self.members()
            .iter()
            .map(|m| MemberFines {
                member: m.clone(),
                is_leader: self.is_leader(&m.id),
                total_fines: member_fines(self.all_sessions(), &m.id, &self.rules),
            })
            .collect()
    }

    /// Fines across all sessions under the current rules
    pub fn total_fines(&self) -> Amount {
        total_fines(self.all_sessions(), &self.rules)
    }

    /// Live split of the active period's expenses across current members
    pub fn current_split(&self) -> CostSplit {
        let total = self.active_period().map_or(0, SettlementPeriod::total_expenses);
        CostSplit::new(total, self.members.len())
    }

    /// Member ranking over all sessions, best first
    pub fn ranking(&self) -> Vec<MemberStats> {
        let sessions: Vec<Session> = self.all_sessions().cloned().collect();
        stats::ranking(self.members(), &sessions, &self.rules)
    }

    /// First session of the active period still awaiting attendance
    pub fn next_session(&self) -> Option<&Session> {
        stats::next_session(self.active_sessions())
    }

    /// True when the active period has an expense or a late/absent record
    pub fn has_settleable_activity(&self) -> bool {
        self.active_period().map_or(false, |p| {
            !p.expenses.is_empty()
                || p.sessions.iter().any(|s| {
                    s.attendance.iter().any(|r| {
                        matches!(r.status, AttendanceStatus::Late | AttendanceStatus::Absent)
                    })
                })
        })
    }

    /// Announcements, newest first
    pub fn announcements(&self) -> &[Announcement] {
        self.board.announcements()
    }

    /// Every file attached to any announcement
    pub fn attachments(&self) -> Vec<Attachment> {
        self.board.attachments().cloned().collect()
    }

    /// Fine vote
    pub fn fine_vote(&self) -> &FineVote {
        &self.fine_vote
    }
}

impl TryFrom<GroupParts> for Group {
    type Error = crate::Error;

    fn try_from(parts: GroupParts) -> Result<Self> {
        Self::restore(parts)
    }
}

impl From<Group> for GroupParts {
    fn from(group: Group) -> Self {
        group.into_parts()
    }
}
