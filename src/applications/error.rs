
use thiserror::Error;

use crate::applications::model::{ApplicationStatus, ReviewerId};


/// Precondition failures reported back to whoever triggered the action.
/// None of them leave state behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewError {
    #[error("Applications are not set up on this server yet (no review channel).")]
    NotConfigured,
    #[error("You already have an application waiting for review.")]
    AlreadyPending,
    #[error("This application is no longer known to the bot.")]
    UnknownApplication,
    #[error("<@{holder}> is already reviewing this application.")]
    AlreadyLocked { holder: ReviewerId },
    #[error("You have to claim this application before acting on it.")]
    NotHolder,
    #[error("This application has already been decided ({0}).")]
    NotPending(ApplicationStatus),
    #[error("Failed to post the application for review: {0}")]
    NotificationFailed(String),
}
