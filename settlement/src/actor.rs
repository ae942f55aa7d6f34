//! Single-writer group actor
//!
//! Every mutation of a group runs inside one Tokio task that owns the
//! [`Group`]. Callers hold a cloneable [`GroupHandle`] and talk to the task
//! over a bounded mailbox, so writes to one group never interleave and a
//! settlement observes every write queued before it.
//!
//! ```text
//! GroupHandle (Clone) ──mpsc (bounded)──▶ GroupActor (single task)
//!        ▲                                   │ owns Group
//!        └────────────── oneshot reply ──────┘
//! ```

use chrono::{NaiveDate, Utc};
use moim_ledger::{Attachment, AttendanceStatus, Member, MemberId, NewExpense, Rules};
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::{
    engine::SettlementEngine,
    group::Group,
    metrics::Metrics,
    types::{MemberFines, SettlementOutcome},
    Error, Result,
};

type Reply<T> = oneshot::Sender<Result<T>>;

/// Message sent to the group actor
pub enum GroupMessage {
    /// Set attendance at a session of the active period
    UpdateAttendance {
        session_id: Uuid,
        member_id: MemberId,
        status: AttendanceStatus,
        response: Reply<()>,
    },

    /// Record an expense in the active period
    AddExpense {
        expense: NewExpense,
        response: Reply<Uuid>,
    },

    /// Schedule a session in the active period
    AddSession {
        date: NaiveDate,
        topic: String,
        response: Reply<Uuid>,
    },

    /// Replace the rules
    UpdateRules {
        rules: Rules,
        response: Reply<()>,
    },

    /// Rename a member
    UpdateMember {
        member_id: MemberId,
        name: String,
        response: Reply<()>,
    },

    /// Remove a member
    RemoveMember {
        member_id: MemberId,
        response: Reply<Member>,
    },

    /// Queue a join request
    RequestJoin {
        candidate: Member,
        response: Reply<()>,
    },

    /// Approve a join request
    ApproveMember {
        member_id: MemberId,
        response: Reply<Member>,
    },

    /// Reject a join request
    RejectMember {
        member_id: MemberId,
        response: Reply<Member>,
    },

    /// Publish an announcement
    AddAnnouncement {
        title: String,
        content: String,
        files: Vec<Attachment>,
        response: Reply<Uuid>,
    },

    /// Vote on how to spend fines
    AddVote {
        option: String,
        response: Reply<u32>,
    },

    /// Settle the active period
    Settle {
        response: Reply<Option<SettlementOutcome>>,
    },

    /// Members with live fines
    MembersWithFines {
        response: oneshot::Sender<Vec<MemberFines>>,
    },

    /// Copy of the whole group
    Snapshot {
        response: oneshot::Sender<Group>,
    },

    /// Shutdown actor
    Shutdown,
}

/// Actor that owns one group
pub struct GroupActor {
    /// The group
    group: Group,

    /// Mailbox for incoming messages
    mailbox: mpsc::Receiver<GroupMessage>,

    /// Settlement engine
    engine: SettlementEngine,

    /// Optional metrics
    metrics: Option<Metrics>,
}

impl GroupActor {
    /// Create new actor
    pub fn new(
        group: Group,
        mailbox: mpsc::Receiver<GroupMessage>,
        engine: SettlementEngine,
        metrics: Option<Metrics>,
    ) -> Self {
        Self {
            group,
            mailbox,
            engine,
            metrics,
        }
    }

    /// Run the actor event loop until shutdown or every handle is dropped
    pub async fn run(mut self) {
        if let Some(m) = &self.metrics {
            m.add_members(self.group.members().len() as i64);
        }

        while let Some(msg) = self.mailbox.recv().await {
            if let GroupMessage::Shutdown = msg {
                break;
            }
            self.handle_message(msg);
        }

        if let Some(m) = &self.metrics {
            m.add_members(-(self.group.members().len() as i64));
        }
        tracing::info!(group = %self.group.id(), "group actor stopped");
    }

    /// Handle a single message
    fn handle_message(&mut self, msg: GroupMessage) {
        match msg {
            GroupMessage::UpdateAttendance {
                session_id,
                member_id,
                status,
                response,
            } => {
                let result = self.group.update_attendance(session_id, &member_id, status);
                if result.is_ok() {
                    self.observe(Metrics::record_attendance_update);
                }
                let _ = response.send(result);
            }

            GroupMessage::AddExpense { expense, response } => {
                let amount = expense.amount;
                let result = self.group.add_expense(expense);
                if result.is_ok() {
                    self.observe(|m| m.record_expense(amount));
                }
                let _ = response.send(result);
            }

            GroupMessage::AddSession {
                date,
                topic,
                response,
            } => {
                let _ = response.send(self.group.add_session(date, topic));
            }

            GroupMessage::UpdateRules { rules, response } => {
                let _ = response.send(self.group.update_rules(rules));
            }

            GroupMessage::UpdateMember {
                member_id,
                name,
                response,
            } => {
                let _ = response.send(self.group.update_member(&member_id, name));
            }

            GroupMessage::RemoveMember {
                member_id,
                response,
            } => {
                let result = self.group.remove_member(&member_id);
                if result.is_ok() {
                    self.observe(|m| m.add_members(-1));
                }
                let _ = response.send(result);
            }

            GroupMessage::RequestJoin {
                candidate,
                response,
            } => {
                let _ = response.send(self.group.request_join(candidate));
            }

            GroupMessage::ApproveMember {
                member_id,
                response,
            } => {
                let result = self.group.approve_member(&member_id);
                if result.is_ok() {
                    self.observe(|m| m.add_members(1));
                }
                let _ = response.send(result);
            }

            GroupMessage::RejectMember {
                member_id,
                response,
            } => {
                let _ = response.send(self.group.reject_member(&member_id));
            }

            GroupMessage::AddAnnouncement {
                title,
                content,
                files,
                response,
            } => {
                let today = Utc::now().date_naive();
                let _ = response.send(Ok(self.group.add_announcement(title, content, files, today)));
            }

            GroupMessage::AddVote { option, response } => {
                let _ = response.send(self.group.add_vote(&option));
            }

            GroupMessage::Settle { response } => {
                let started = Instant::now();
                let result = self.group.settle(&self.engine, Utc::now());
                match &result {
                    Ok(Some(_)) => {
                        let elapsed = started.elapsed().as_secs_f64();
                        self.observe(|m| m.record_settlement(elapsed));
                    }
                    Ok(None) => self.observe(Metrics::record_settlement_noop),
                    Err(e) => tracing::error!(group = %self.group.id(), "settlement failed: {}", e),
                }
                let _ = response.send(result);
            }

            GroupMessage::MembersWithFines { response } => {
                let _ = response.send(self.group.members_with_fines());
            }

            GroupMessage::Snapshot { response } => {
                let _ = response.send(self.group.clone());
            }

            GroupMessage::Shutdown => {
                // Handled in run loop
            }
        }
    }

    fn observe(&self, f: impl FnOnce(&Metrics)) {
        if let Some(m) = &self.metrics {
            f(m);
        }
    }
}

/// Handle for sending messages to the actor
#[derive(Clone)]
pub struct GroupHandle {
    sender: mpsc::Sender<GroupMessage>,
}

impl GroupHandle {
    /// Create new handle
    pub fn new(sender: mpsc::Sender<GroupMessage>) -> Self {
        Self { sender }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> GroupMessage) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(build(tx))
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// Set attendance at a session of the active period
    pub async fn update_attendance(
        &self,
        session_id: Uuid,
        member_id: MemberId,
        status: AttendanceStatus,
    ) -> Result<()> {
        self.request(|response| GroupMessage::UpdateAttendance {
            session_id,
            member_id,
            status,
            response,
        })
        .await?
    }

    /// Record an expense in the active period
    pub async fn add_expense(&self, expense: NewExpense) -> Result<Uuid> {
        self.request(|response| GroupMessage::AddExpense { expense, response })
            .await?
    }

    /// Schedule a session in the active period
    pub async fn add_meeting(&self, date: NaiveDate, topic: impl Into<String>) -> Result<Uuid> {
        let topic = topic.into();
        self.request(|response| GroupMessage::AddSession {
            date,
            topic,
            response,
        })
        .await?
    }

    /// Replace the rules
    pub async fn update_rules(&self, rules: Rules) -> Result<()> {
        self.request(|response| GroupMessage::UpdateRules { rules, response })
            .await?
    }

    /// Rename a member
    pub async fn update_member(&self, member_id: MemberId, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        self.request(|response| GroupMessage::UpdateMember {
            member_id,
            name,
            response,
        })
        .await?
    }

    /// Remove a member
    pub async fn remove_member(&self, member_id: MemberId) -> Result<Member> {
        self.request(|response| GroupMessage::RemoveMember {
            member_id,
            response,
        })
        .await?
    }

    /// Queue a join request
    pub async fn request_join(&self, candidate: Member) -> Result<()> {
        self.request(|response| GroupMessage::RequestJoin {
            candidate,
            response,
        })
        .await?
    }

    /// Approve a join request
    pub async fn approve_member(&self, member_id: MemberId) -> Result<Member> {
        self.request(|response| GroupMessage::ApproveMember {
            member_id,
            response,
        })
        .await?
    }

    /// Reject a join request
    pub async fn reject_member(&self, member_id: MemberId) -> Result<Member> {
        self.request(|response| GroupMessage::RejectMember {
            member_id,
            response,
        })
        .await?
    }

    /// Publish an announcement
    pub async fn add_announcement(
        &self,
        title: impl Into<String>,
        content: impl Into<String>,
        files: Vec<Attachment>,
    ) -> Result<Uuid> {
        let (title, content) = (title.into(), content.into());
        self.request(|response| GroupMessage::AddAnnouncement {
            title,
            content,
            files,
            response,
        })
        .await?
    }

    /// Vote on how to spend fines
    pub async fn add_vote(&self, option: impl Into<String>) -> Result<u32> {
        let option = option.into();
        self.request(|response| GroupMessage::AddVote { option, response })
            .await?
    }

    /// Settle the active period; `None` when there is none
    pub async fn settle_current_period(&self) -> Result<Option<SettlementOutcome>> {
        self.request(|response| GroupMessage::Settle { response })
            .await?
    }

    /// Members with fines computed from the current rules
    pub async fn members_with_fines(&self) -> Result<Vec<MemberFines>> {
        self.request(|response| GroupMessage::MembersWithFines { response })
            .await
    }

    /// Copy of the whole group for read models
    pub async fn snapshot(&self) -> Result<Group> {
        self.request(|response| GroupMessage::Snapshot { response })
            .await
    }

    /// Leadership of `member_id` in this group
    pub async fn is_leader(&self, member_id: &MemberId) -> Result<bool> {
        Ok(self.snapshot().await?.is_leader(member_id))
    }

    /// Shutdown actor
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(GroupMessage::Shutdown)
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;
        Ok(())
    }
}

/// Spawn the group actor
pub fn spawn_group_actor(
    group: Group,
    engine: SettlementEngine,
    metrics: Option<Metrics>,
    mailbox_capacity: usize,
) -> GroupHandle {
    let (tx, rx) = mpsc::channel(mailbox_capacity.max(1)); // Bounded channel for backpressure
    let actor = GroupActor::new(group, rx, engine, metrics);

    tokio::spawn(async move {
        actor.run().await;
    });

    GroupHandle::new(tx)
}
