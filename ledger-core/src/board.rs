//! Announcement board and fine vote

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Announcement, Attachment};
use crate::{Error, Result};

/// Announcements, most recent first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    announcements: Vec<Announcement>,
}

impl Board {
    /// Empty board
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish an announcement at the top of the board
    pub fn post(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
        date: NaiveDate,
        files: Vec<Attachment>,
    ) -> Uuid {
        let announcement = Announcement {
            id: Uuid::now_v7(),
            title: title.into(),
            content: content.into(),
            date,
            files,
        };
        let id = announcement.id;
        self.announcements.insert(0, announcement);
        id
    }

    /// All announcements, newest first
    pub fn announcements(&self) -> &[Announcement] {
        &self.announcements
    }

    /// Every attachment of every announcement, newest first
    pub fn attachments(&self) -> impl Iterator<Item = &Attachment> {
        self.announcements.iter().flat_map(|a| a.files.iter())
    }

    /// Newest `n` announcements
    pub fn latest(&self, n: usize) -> &[Announcement] {
        &self.announcements[..n.min(self.announcements.len())]
    }
}

/// One choice in a fine vote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteOption {
    /// Label
    pub option: String,

    /// Votes cast
    pub votes: u32,
}

/// Vote on how to spend collected fines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FineVote {
    /// Question put to the group
    pub topic: String,

    /// Choices, in display order
    pub options: Vec<VoteOption>,
}

impl FineVote {
    /// Vote with zero counts for every option
    pub fn new(topic: impl Into<String>, options: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            topic: topic.into(),
            options: options
                .into_iter()
                .map(|o| VoteOption {
                    option: o.into(),
                    votes: 0,
                })
                .collect(),
        }
    }

    /// Cast one vote
    pub fn cast(&mut self, option: &str) -> Result<u32> {
        let entry = self
            .options
            .iter_mut()
            .find(|o| o.option == option)
            .ok_or_else(|| Error::not_found("vote option", option))?;
        entry.votes += 1;
        Ok(entry.votes)
    }

    /// Option with the most votes; first listed wins a tie
    pub fn leading(&self) -> Option<&VoteOption> {
        self.options
            .iter()
            .fold(None, |best: Option<&VoteOption>, o| match best {
                Some(b) if b.votes >= o.votes => Some(b),
                _ => Some(o),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttachmentKind;

    #[test]
    fn test_board_is_newest_first() {
        let mut board = Board::new();
        let day = NaiveDate::from_ymd_opt(2024, 7, 23).unwrap();
        board.post("Checkpoint", "update notion", day, vec![]);
        let newest = board.post(
            "Next week",
            "presentation order",
            day.succ_opt().unwrap(),
            vec![Attachment {
                name: "guide.pdf".to_string(),
                url: "#".to_string(),
                kind: AttachmentKind::Pdf,
            }],
        );

        assert_eq!(board.announcements()[0].id, newest);
        assert_eq!(board.latest(1).len(), 1);
        assert_eq!(board.latest(10).len(), 2);
        assert_eq!(board.attachments().count(), 1);
    }

    #[test]
    fn test_fine_vote() {
        let mut vote = FineVote::new("How to spend fines?", ["dinner", "snacks", "supplies"]);
        assert_eq!(vote.leading().unwrap().option, "dinner");

        vote.cast("snacks").unwrap();
        assert_eq!(vote.cast("snacks").unwrap(), 2);
        assert_eq!(vote.leading().unwrap().option, "snacks");

        assert!(vote.cast("travel").unwrap_err().is_not_found());
    }
}
