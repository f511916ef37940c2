
use serenity::model::id::{ChannelId, GuildId, MessageId, UserId};
use serde::{Serialize, Deserialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

use std::fmt;


pub type ApplicantId = UserId;
pub type ReviewerId = UserId;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn is_terminal(&self) -> bool {
        *self != ApplicationStatus::Pending
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub question: String,
    pub response: String,
}

impl Answer {
    pub fn new(question: impl Into<String>, response: impl Into<String>) -> Answer {
        Answer { question: question.into(), response: response.into() }
    }
}

/// Handle of a posted message, used for in-place edits.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct NotificationRef {
    pub channel: ChannelId,
    pub message: MessageId,
}

/// Identifies one application. The applicant id is the unit of locking,
/// the uuid tells a fresh application apart from an older one of the same
/// applicant so stale buttons cannot act on it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ApplicationRef {
    pub applicant_id: ApplicantId,
    pub application_id: Uuid,
}

impl fmt::Display for ApplicationRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.applicant_id, self.application_id)
    }
}

#[derive(Debug, Clone)]
pub struct Application {
    pub id: Uuid,
    pub guild_id: GuildId,
    pub panel: String,
    pub applicant_id: ApplicantId,
    pub answers: Vec<Answer>,
    pub status: ApplicationStatus,
    pub decided_by: Option<ReviewerId>,
    pub notification: Option<NotificationRef>,
    pub submitted_at: i64,
}

impl Application {
    pub fn reference(&self) -> ApplicationRef {
        ApplicationRef { applicant_id: self.applicant_id, application_id: self.id }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ReviewLock {
    pub holder_id: Option<ReviewerId>,
    pub claimed_at: Option<i64>,
    pub last_active: Option<i64>,
}

impl ReviewLock {

    pub fn is_held(&self) -> bool {
        self.holder_id.is_some()
    }

    pub fn is_held_by(&self, reviewer: ReviewerId) -> bool {
        self.holder_id == Some(reviewer)
    }

    pub fn set(&mut self, reviewer: ReviewerId, now: i64) {
        self.holder_id = Some(reviewer);
        self.claimed_at = Some(now);
        self.last_active = Some(now);
    }

    /// Records holder activity, pushing expiry back.
    pub fn touch(&mut self, now: i64) {
        if self.holder_id.is_some() {
            self.last_active = Some(now);
        }
    }

    pub fn clear(&mut self) {
        self.holder_id = None;
        self.claimed_at = None;
        self.last_active = None;
    }

    /// True once the holder has been idle for at least `timeout_secs`.
    pub fn is_expired(&self, timeout_secs: Option<u64>, now: i64) -> bool {
        match (self.last_active, timeout_secs) {
            (Some(last_active), Some(timeout)) => now - last_active >= timeout as i64,
            _ => false,
        }
    }
}

/// Review state as seen by the renderer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReviewState {
    Unclaimed,
    Claimed(ReviewerId),
    Decided(ApplicationStatus),
}

impl ReviewState {
    pub fn of(status: ApplicationStatus, lock: &ReviewLock) -> ReviewState {
        if status.is_terminal() {
            return ReviewState::Decided(status);
        }
        match lock.holder_id {
            Some(holder) => ReviewState::Claimed(holder),
            None => ReviewState::Unclaimed,
        }
    }
}
