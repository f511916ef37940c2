
use serenity::model::id::UserId;
use strum_macros::{Display, EnumIter, EnumString};
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use std::str::FromStr;

use crate::applications::model::ApplicationRef;


#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ReviewAction {
    Claim,
    Accept,
    Reject,
    Info,
}

/// Every button the bot renders carries one of these as its custom id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentId {
    Apply(String),
    Review(ReviewAction, ApplicationRef),
}

static APPLY_REGEX: Lazy<Regex> = Lazy::new(||
    Regex::new(r"^apply:([a-z0-9_-]{1,32})$").unwrap());
static REVIEW_REGEX: Lazy<Regex> = Lazy::new(||
    Regex::new(r"^review:([a-z]+):([0-9]{1,20}):([0-9a-f-]{36})$").unwrap());

impl ComponentId {

    pub fn encode(&self) -> String {
        match self {
            ComponentId::Apply(panel) => format!("apply:{}", panel),
            ComponentId::Review(action, reference) => format!("review:{}:{}:{}",
                action,
                reference.applicant_id.get(),
                reference.application_id),
        }
    }

    pub fn parse(custom_id: &str) -> Option<ComponentId> {
        if let Some(captures) = APPLY_REGEX.captures(custom_id) {
            return Some(ComponentId::Apply(captures[1].to_string()));
        }
        let captures = REVIEW_REGEX.captures(custom_id)?;
        let action = ReviewAction::from_str(&captures[1]).ok()?;
        let applicant = captures[2].parse::<u64>().ok().filter(|id| *id != 0)?;
        let application_id = Uuid::parse_str(&captures[3]).ok()?;
        Some(ComponentId::Review(action, ApplicationRef {
            applicant_id: UserId::new(applicant),
            application_id,
        }))
    }
}
