//! Moim Ledger Core
//!
//! Data model and ledgers for a small recurring group: attendance, shared
//! expenses, settlement periods and membership.
//!
//! # Architecture
//!
//! - **Rules**: deposit and fines, applied live on every read
//! - **Attendance**: one record per (session, member); fines are derived
//! - **Expenses**: positive amounts split evenly in integer units
//! - **Periods**: `Open -> Sealed`, writes only reach the open period
//! - **Membership**: active members, pending requests, a single leader

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]
//!
//! # Invariants
//!
//! - At most one open period per group
//! - A sealed period has an end date and is never reopened
//! - Cost shares add back up to the period's total expenses
//! - `Present` and `Pending` never carry a fine

#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod types;
pub mod attendance;
pub mod expense;
pub mod period;
pub mod membership;
pub mod board;
pub mod stats;
pub mod error;
pub mod config;

// Re-exports
pub use error::{Error, Result};
pub use types::{
    Amount, Announcement, Attachment, AttachmentKind, AttendanceRecord, AttendanceStatus,
    Expense, Member, MemberId, NewExpense, Rules, Session,
};
pub use attendance::{checked_member_fines, fine_for, member_fines, total_fines};
pub use expense::{checked_total_expenses, cost_per_member, total_expenses, CostSplit};
pub use period::SettlementPeriod;
pub use membership::MembershipRegistry;
pub use board::{Board, FineVote, VoteOption};
pub use stats::MemberStats;
pub use config::Config;
