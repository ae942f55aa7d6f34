//! Group bootstrap configuration

use serde::{Deserialize, Serialize};

use crate::types::Rules;

/// Settings used to create a group
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Group name
    pub name: String,

    /// One-line description
    pub description: String,

    /// Deposit and fines
    pub rules: Rules,

    /// Founding leader
    pub leader: LeaderConfig,

    /// Fine vote shown to members
    pub fine_vote: FineVoteConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: "모임 총무".to_string(),
            description: "모임 출결과 회비를 관리합니다".to_string(),
            rules: Rules::default(),
            leader: LeaderConfig::default(),
            fine_vote: FineVoteConfig::default(),
        }
    }
}

/// Founding leader
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderConfig {
    /// Member ID
    pub id: String,

    /// Display name
    pub name: String,
}

impl Default for LeaderConfig {
    fn default() -> Self {
        Self {
            id: "1".to_string(),
            name: "모임장".to_string(),
        }
    }
}

/// Fine vote topic and choices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FineVoteConfig {
    /// Question
    pub topic: String,

    /// Choices
    pub options: Vec<String>,
}

impl Default for FineVoteConfig {
    fn default() -> Self {
        Self {
            topic: "누적된 벌금, 어디에 사용할까요?".to_string(),
            options: vec![
                "프로젝트 종료 후 회식비".to_string(),
                "스터디 간식비로 사용".to_string(),
                "부족한 스터디 비품 구매".to_string(),
            ],
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(name) = std::env::var("MOIM_GROUP_NAME") {
            config.name = name;
        }

        if let Some(v) = env_amount("MOIM_INITIAL_DEPOSIT")? {
            config.rules.initial_deposit = v;
        }

        if let Some(v) = env_amount("MOIM_LATE_FINE")? {
            config.rules.late_fine = v;
        }

        if let Some(v) = env_amount("MOIM_ABSENT_FINE")? {
            config.rules.absent_fine = v;
        }

        config.validate()?;
        Ok(config)
    }

    /// Rules must be non-negative and the leader must have an ID
    pub fn validate(&self) -> crate::Result<()> {
        self.rules
            .validate()
            .map_err(|e| crate::Error::Config(format!("Invalid rules: {}", e)))?;
        if self.leader.id.trim().is_empty() {
            return Err(crate::Error::Config("Leader id must not be empty".to_string()));
        }
        Ok(())
    }
}

fn env_amount(key: &str) -> crate::Result<Option<i64>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|e| crate::Error::Config(format!("{}: {}", key, e))),
        Err(_) => Ok(None),
    }
}
