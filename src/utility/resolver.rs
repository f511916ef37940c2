
use serenity::all::{Cache, CacheHttp, Http};
use serenity::model::prelude::*;
use serenity::prelude::*;

use std::sync::Arc;

use crate::utility::*;
use crate::databases::*;


#[derive(Clone)]
pub struct Resolver {
    ctx: Context,
    guild_id: Option<GuildId>,
}

impl CacheHttp for Resolver {
    fn http(&self) -> &Http {
        &self.ctx.http
    }
    fn cache(&self) -> Option<&Arc<Cache>> {
        Some(&self.ctx.cache)
    }
}

impl AsRef<Http> for Resolver {
    fn as_ref(&self) -> &Http {
        &self.ctx.http
    }
}

impl Resolver {

    pub fn new(ctx: Context, guild_id: Option<GuildId>) -> Resolver {
        Resolver { ctx, guild_id }
    }

    pub fn ctx(&self) -> &Context {
        &self.ctx
    }

    pub async fn resolve_guild(&self) -> Option<PartialGuild> {
        let guild_id = self.guild_id?;
        guild_id.to_partial_guild(self).await.ok()
    }

    pub async fn has_role(&self, user: &User, roles: impl ToList<RoleId>) -> bool {
        let guild_id = match self.guild_id {
            Some(guild_id) => guild_id,
            None => return false,
        };
        for role in roles.to_list() {
            if let Ok(true) = user.has_role(self, guild_id, role).await {
                return true;
            }
        }
        false
    }

    /// Guild owners and holders of the configured `role_admin` count as admins.
    pub async fn is_admin(&self, user: &User) -> bool {
        if let Some(guild) = self.resolve_guild().await {
            if guild.owner_id == user.id {
                return true;
            }
        }
        let role_admin = ConfigDB::get_instance().lock().await
            .get("role_admin").await;
        let role = role_admin.ok()
            .and_then(|entry| RegexManager::mentioned_id(RegexManager::get_role_regex(), &entry.value));
        match role {
            Some(role) => self.has_role(user, RoleId::new(role)).await,
            None => false,
        }
    }

}
