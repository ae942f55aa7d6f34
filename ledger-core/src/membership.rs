//! Membership registry
//!
//! Active members in join order, pending join requests, and the single
//! leader. Leadership lives here as one ID so a member can never be
//! "leader" in two places at once.

use serde::{Deserialize, Serialize};

use crate::types::{Amount, Member, MemberId, Rules};
use crate::{Error, Result};

/// Active and pending members of one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipRegistry {
    active: Vec<Member>,
    pending: Vec<Member>,
    leader_id: MemberId,
}

impl MembershipRegistry {
    /// Registry whose only member is the leader
    pub fn new(leader: Member) -> Self {
        Self {
            leader_id: leader.id.clone(),
            active: vec![leader],
            pending: Vec::new(),
        }
    }

    /// Rebuild a registry from stored parts; the leader must be active
    pub fn from_parts(active: Vec<Member>, pending: Vec<Member>, leader_id: MemberId) -> Result<Self> {
        if !active.iter().any(|m| m.id == leader_id) {
            return Err(Error::InvalidState(format!(
                "leader {} is not an active member",
                leader_id
            )));
        }
        Ok(Self {
            active,
            pending,
            leader_id,
        })
    }

    /// Active members in join order
    pub fn members(&self) -> &[Member] {
        &self.active
    }

    /// Pending join requests in arrival order
    pub fn pending(&self) -> &[Member] {
        &self.pending
    }

    /// Number of active members
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// True without active members
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// IDs of active members in join order
    pub fn ids(&self) -> impl Iterator<Item = &MemberId> {
        self.active.iter().map(|m| &m.id)
    }

    /// Active member by ID
    pub fn get(&self, id: &MemberId) -> Option<&Member> {
        self.active.iter().find(|m| &m.id == id)
    }

    /// Current leader
    pub fn leader_id(&self) -> &MemberId {
        &self.leader_id
    }

    /// Leadership is derived from the registry, never stored on members
    pub fn is_leader(&self, id: &MemberId) -> bool {
        &self.leader_id == id
    }

    /// Queue a join request
    pub fn request_join(&mut self, candidate: Member) -> Result<()> {
        if self.get(&candidate.id).is_some() || self.pending_index(&candidate.id).is_some() {
            return Err(Error::InvalidState(format!(
                "member {} is already active or pending",
                candidate.id
            )));
        }
        tracing::debug!(member = %candidate.id, "join request queued");
        self.pending.push(candidate);
        Ok(())
    }

    /// Move a pending member to the active set with the current deposit
    pub fn approve(&mut self, id: &MemberId, rules: &Rules) -> Result<&Member> {
        let idx = self
            .pending_index(id)
            .ok_or_else(|| Error::not_found("pending member", id))?;

        let mut member = self.pending.remove(idx);
        member.balance = rules.initial_deposit;
        tracing::info!(member = %member.id, deposit = member.balance, "member approved");

        self.active.push(member);
        self.active
            .last()
            .ok_or_else(|| Error::InvalidState("approved member missing".to_string()))
    }

    /// Drop a pending request
    pub fn reject(&mut self, id: &MemberId) -> Result<Member> {
        let idx = self
            .pending_index(id)
            .ok_or_else(|| Error::not_found("pending member", id))?;
        tracing::info!(member = %id, "join request rejected");
        Ok(self.pending.remove(idx))
    }

    /// Remove an active member; the leader cannot be removed
    pub fn remove(&mut self, id: &MemberId) -> Result<Member> {
        if self.is_leader(id) {
            return Err(Error::InvalidState(format!("cannot remove leader {}", id)));
        }
        let idx = self
            .active
            .iter()
            .position(|m| &m.id == id)
            .ok_or_else(|| Error::not_found("member", id))?;
        tracing::info!(member = %id, "member removed");
        Ok(self.active.remove(idx))
    }

    /// Profile edit: only the name changes
    pub fn rename(&mut self, id: &MemberId, name: impl Into<String>) -> Result<()> {
        let member = self
            .active
            .iter_mut()
            .find(|m| &m.id == id)
            .ok_or_else(|| Error::not_found("member", id))?;
        member.name = name.into();
        Ok(())
    }

    /// Replace balances in one step: every ID is checked before any write
    pub fn apply_balances(&mut self, updates: &[(MemberId, Amount)]) -> Result<()> {
        for (id, _) in updates {
            if self.get(id).is_none() {
                return Err(Error::not_found("member", id));
            }
        }
        for (id, balance) in updates {
            if let Some(member) = self.active.iter_mut().find(|m| &m.id == id) {
                member.balance = *balance;
            }
        }
        Ok(())
    }

    fn pending_index(&self, id: &MemberId) -> Option<usize> {
        self.pending.iter().position(|m| &m.id == id)
    }
}
