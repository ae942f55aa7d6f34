//! Moim Settlement Engine
//!
//! Closes a group's settlement period into a balance report.
//!
//! # Architecture
//!
//! A group runs in periods (usually a calendar month):
//!
//! 1. **Collection**: sessions and expenses land on the active period
//! 2. **Planning**: fines from finalized sessions, even cost split
//! 3. **Reporting**: a per-member breakdown posted as an announcement
//! 4. **Rollover**: balances replaced, period sealed, next month opened
//!
//! # Cost Split
//!
//! Integer split in the smallest currency unit:
//! - Every member carries `total / n`
//! - The first `total % n` members in order carry one unit more
//! - Shares always add back up to the total
//!
//! # Example
//!
//! ```no_run
//! use moim_settlement::{Config, Directory};
//!
//! #[tokio::main]
//! async fn main() -> moim_settlement::Result<()> {
//!     let config = Config::default();
//!     let directory = Directory::new(&config)?;
//!     let today = chrono::Utc::now().date_naive();
//!     let (_, group) = directory.create(&config.group, today)?;
//!
//!     // Close the current period
//!     if let Some(outcome) = group.settle_current_period().await? {
//!         println!("{}\n{}", outcome.report.title, outcome.report.body);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms, clippy::all)]

pub mod types;
pub mod group;
pub mod report;
pub mod engine;
pub mod actor;
pub mod directory;
pub mod metrics;
pub mod error;
pub mod config;

// Re-exports
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use group::{Group, GroupParts};
pub use engine::SettlementEngine;
pub use report::ReportGenerator;
pub use actor::{spawn_group_actor, GroupHandle};
pub use directory::Directory;
pub use metrics::Metrics;
