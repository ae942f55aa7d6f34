//! Core types for the group ledger
//!
//! All money is an [`Amount`]: a signed integer in the smallest currency
//! unit. Nothing in the ledger uses floating point for money.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::{Error, Result};

/// Money in the smallest currency unit (e.g. won)
pub type Amount = i64;

/// Member identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberId(String);

impl MemberId {
    /// Create new member ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MemberId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Group rules: deposit and fines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    /// Balance a member starts with on approval
    pub initial_deposit: Amount,

    /// Fine for a late arrival
    pub late_fine: Amount,

    /// Fine for an absence
    pub absent_fine: Amount,
}

impl Rules {
    /// Create rules
    pub fn new(initial_deposit: Amount, late_fine: Amount, absent_fine: Amount) -> Self {
        Self {
            initial_deposit,
            late_fine,
            absent_fine,
        }
    }

    /// All three values must be non-negative
    pub fn validate(&self) -> Result<()> {
        for value in [self.initial_deposit, self.late_fine, self.absent_fine] {
            if value < 0 {
                return Err(Error::InvalidAmount(value));
            }
        }
        Ok(())
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            initial_deposit: 20_000,
            late_fine: 3_000,
            absent_fine: 5_000,
        }
    }
}

/// Attendance status of one member at one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    /// On time
    Present,
    /// Arrived late
    Late,
    /// Did not attend
    Absent,
    /// Attendance not taken yet
    Pending,
}

impl AttendanceStatus {
    /// Anything but `Pending`
    pub fn is_finalized(&self) -> bool {
        !matches!(self, AttendanceStatus::Pending)
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Late => "late",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Pending => "pending",
        };
        f.write_str(s)
    }
}

/// Group member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Member ID
    pub id: MemberId,

    /// Display name
    pub name: String,

    /// Profile picture
    pub avatar_url: Option<String>,

    /// Running balance; starts at the deposit, reduced by each settlement
    pub balance: Amount,
}

impl Member {
    /// Create a member with a zero balance
    pub fn new(id: impl Into<MemberId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            avatar_url: None,
            balance: 0,
        }
    }

    /// Set the avatar
    pub fn with_avatar(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }
}

/// One member's attendance at one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Member ID
    pub member_id: MemberId,

    /// Current status
    pub status: AttendanceStatus,
}

/// A meeting session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Session ID
    pub id: Uuid,

    /// Meeting date
    pub date: NaiveDate,

    /// Topic
    pub topic: String,

    /// One record per member known when the session was created
    pub attendance: Vec<AttendanceRecord>,
}

/// Shared expense
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Expense ID
    pub id: Uuid,

    /// What was bought
    pub description: String,

    /// Positive amount
    pub amount: Amount,

    /// Date paid
    pub date: NaiveDate,

    /// Member who paid
    pub paid_by: MemberId,

    /// Receipt image or link
    pub receipt_url: Option<String>,
}

/// Expense fields supplied by the caller; the ledger assigns the ID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExpense {
    /// What was bought
    pub description: String,

    /// Amount, must be positive
    pub amount: Amount,

    /// Date paid
    pub date: NaiveDate,

    /// Member who paid
    pub paid_by: MemberId,

    /// Receipt image or link
    pub receipt_url: Option<String>,
}

/// Kind of file attached to an announcement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    /// PDF document
    Pdf,
    /// External link
    Link,
    /// Any other file
    File,
}

/// File attached to an announcement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Display name
    pub name: String,

    /// Location
    pub url: String,

    /// Kind
    pub kind: AttachmentKind,
}

/// Announcement on the group board; settlement reports are announcements too
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    /// Announcement ID
    pub id: Uuid,

    /// Title
    pub title: String,

    /// Body text
    pub content: String,

    /// Creation date
    pub date: NaiveDate,

    /// Attached files (empty for settlement reports)
    pub files: Vec<Attachment>,
}
