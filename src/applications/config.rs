
use serenity::model::id::{ChannelId, GuildId, RoleId};
use serde::{Serialize, Deserialize};
use tokio::sync::RwLock;

use std::collections::HashMap;


/// Per guild intake settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeConfig {
    pub review_channel: Option<ChannelId>,
    pub decision_channel: Option<ChannelId>,
    #[serde(default)]
    pub accept_roles: Vec<RoleId>,
    #[serde(default)]
    pub remove_roles: Vec<RoleId>,
    #[serde(default)]
    pub claim_timeout_secs: Option<u64>,
}

impl IntakeConfig {

    pub fn to_json(&self) -> String {
        // plain ids and options, cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn from_json(value: &str) -> Option<IntakeConfig> {
        serde_json::from_str(value).ok()
    }
}

pub struct ConfigStore {
    configs: RwLock<HashMap<GuildId, IntakeConfig>>,
}

impl ConfigStore {

    pub fn new() -> ConfigStore {
        ConfigStore { configs: RwLock::new(HashMap::new()) }
    }

    pub async fn get(&self, guild: GuildId) -> IntakeConfig {
        self.configs.read().await
            .get(&guild)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn set(&self, guild: GuildId, config: IntakeConfig) {
        self.configs.write().await.insert(guild, config);
    }

    /// Applies `change` to the guild's config and returns the result.
    pub async fn update(&self, guild: GuildId, change: impl FnOnce(&mut IntakeConfig)) -> IntakeConfig {
        let mut configs = self.configs.write().await;
        let config = configs.entry(guild).or_default();
        change(config);
        config.clone()
    }
}
