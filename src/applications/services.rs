
use serenity::model::id::{ChannelId, GuildId, RoleId, UserId};

use std::fmt;

use crate::applications::model::{Answer, NotificationRef};
use crate::applications::panel::Question;
use crate::applications::render::{Affordance, Content};
use crate::utility::BoxedFuture;


/// Posts and edits notifications.
pub trait Notifier: Send + Sync {

    fn post<'a>(&'a self,
                destination: ChannelId,
                content: &'a Content,
                affordances: &'a [Affordance]) -> BoxedFuture<'a, anyhow::Result<NotificationRef>>;

    fn update<'a>(&'a self,
                  notification: NotificationRef,
                  content: &'a Content,
                  affordances: &'a [Affordance]) -> BoxedFuture<'a, anyhow::Result<()>>;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RoleChange {
    Grant,
    Revoke,
}

impl fmt::Display for RoleChange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RoleChange::Grant => write!(f, "grant"),
            RoleChange::Revoke => write!(f, "revoke"),
        }
    }
}

/// Result of one role mutation. Failures are kept as text, they are
/// reported but never undo the decision they accompany.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleOutcome {
    pub role: RoleId,
    pub change: RoleChange,
    pub error: Option<String>,
}

impl RoleOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Adds and removes roles on guild members.
pub trait MembershipMutator: Send + Sync {

    fn grant_role<'a>(&'a self, guild: GuildId, user: UserId, role: RoleId) -> BoxedFuture<'a, anyhow::Result<()>>;

    fn revoke_role<'a>(&'a self, guild: GuildId, user: UserId, role: RoleId) -> BoxedFuture<'a, anyhow::Result<()>>;

    fn grant_roles<'a>(&'a self, guild: GuildId, user: UserId, roles: &'a [RoleId]) -> BoxedFuture<'a, Vec<RoleOutcome>> {
        Box::pin(async move {
            let mut outcomes = Vec::new();
            for role in roles.iter() {
                let result = self.grant_role(guild, user, *role).await;
                outcomes.push(RoleOutcome {
                    role: *role,
                    change: RoleChange::Grant,
                    error: result.err().map(|err| err.to_string()),
                });
            }
            outcomes
        })
    }

    fn revoke_roles<'a>(&'a self, guild: GuildId, user: UserId, roles: &'a [RoleId]) -> BoxedFuture<'a, Vec<RoleOutcome>> {
        Box::pin(async move {
            let mut outcomes = Vec::new();
            for role in roles.iter() {
                let result = self.revoke_role(guild, user, *role).await;
                outcomes.push(RoleOutcome {
                    role: *role,
                    change: RoleChange::Revoke,
                    error: result.err().map(|err| err.to_string()),
                });
            }
            outcomes
        })
    }
}

/// Asks the applicant a question set. `None` means the form was cancelled
/// or timed out.
pub trait InputCollector: Send + Sync {
    fn collect<'a>(&'a self, title: &'a str, questions: &'a [Question]) -> BoxedFuture<'a, Option<Vec<Answer>>>;
}
