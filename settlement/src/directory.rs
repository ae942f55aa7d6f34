//! Directory of running groups
//!
//! One actor per group; the directory only maps group IDs to handles, so
//! groups never contend with each other.

use chrono::NaiveDate;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    actor::{spawn_group_actor, GroupHandle},
    config::Config,
    engine::SettlementEngine,
    group::Group,
    metrics::Metrics,
    types::GroupSummary,
    Error, Result,
};

struct Entry {
    summary: GroupSummary,
    handle: GroupHandle,
}

/// Registry of group actors
#[derive(Clone)]
pub struct Directory {
    groups: Arc<DashMap<Uuid, Entry>>,
    engine: SettlementEngine,
    metrics: Option<Metrics>,
    mailbox_capacity: usize,
}

impl Directory {
    /// Create an empty directory
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let metrics = if config.metrics_enabled {
            Some(Metrics::new()?)
        } else {
            None
        };

        Ok(Self {
            groups: Arc::new(DashMap::new()),
            engine: SettlementEngine::from_config(config),
            metrics,
            mailbox_capacity: config.actor.mailbox_capacity,
        })
    }

    /// Start an actor for `group` and register it
    pub fn register(&self, group: Group) -> GroupHandle {
        let summary = group.summary();
        let id = summary.id;
        let handle = spawn_group_actor(
            group,
            self.engine.clone(),
            self.metrics.clone(),
            self.mailbox_capacity,
        );

        tracing::info!(group = %id, name = %summary.name, "group registered");
        self.groups.insert(
            id,
            Entry {
                summary,
                handle: handle.clone(),
            },
        );
        handle
    }

    /// Create a group from bootstrap configuration and register it
    pub fn create(&self, config: &moim_ledger::Config, today: NaiveDate) -> Result<(Uuid, GroupHandle)> {
        let group = Group::from_config(config, today)?;
        let id = group.id();
        Ok((id, self.register(group)))
    }

    /// Handle of a registered group
    pub fn get(&self, id: Uuid) -> Result<GroupHandle> {
        self.groups
            .get(&id)
            .map(|e| e.handle.clone())
            .ok_or(Error::UnknownGroup(id))
    }

    /// Every registered group, ordered by ID
    pub fn list(&self) -> Vec<GroupSummary> {
        let mut all: Vec<GroupSummary> = self.groups.iter().map(|e| e.summary.clone()).collect();
        all.sort_by_key(|s| s.id);
        all
    }

    /// Stop a group's actor and forget it
    pub async fn remove(&self, id: Uuid) -> Result<()> {
        let (_, entry) = self.groups.remove(&id).ok_or(Error::UnknownGroup(id))?;
        entry.handle.shutdown().await
    }

    /// Shared metrics, when enabled
    pub fn metrics(&self) -> Option<&Metrics> {
        self.metrics.as_ref()
    }
}
