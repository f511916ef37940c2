
use serenity::model::id::{ChannelId, RoleId};
use nonempty::nonempty;

use crate::applications::IntakeConfig;
use crate::commands::command::*;
use crate::utility::*;
use crate::databases::*;


#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Setting {
    Review(ChannelId),
    Decision(Option<ChannelId>),
    AcceptRoles(Vec<RoleId>),
    RemoveRoles(Vec<RoleId>),
    ClaimTimeout(Option<u64>),
    Show,
}

impl Setting {

    pub fn parse(arguments: &[String]) -> Option<Setting> {
        let (name, values) = arguments.split_first()?;
        let channel = |word: &String| RegexManager::mentioned_id(RegexManager::get_channel_regex(), word)
            .map(ChannelId::new);
        let roles = || values.iter()
            .map(|word| RegexManager::mentioned_id(RegexManager::get_role_regex(), word).map(RoleId::new))
            .collect::<Option<Vec<RoleId>>>();

        match (name.to_lowercase().as_str(), values) {
            ("review", [target]) => channel(target).map(Setting::Review),
            ("decision", [target]) if is_off(target) => Some(Setting::Decision(None)),
            ("decision", [target]) => channel(target).map(|channel| Setting::Decision(Some(channel))),
            ("accept-roles", _) => roles().map(Setting::AcceptRoles),
            ("remove-roles", _) => roles().map(Setting::RemoveRoles),
            ("claim-timeout", [minutes]) if is_off(minutes) => Some(Setting::ClaimTimeout(None)),
            ("claim-timeout", [minutes]) => match minutes.parse::<u64>() {
                Ok(0) => Some(Setting::ClaimTimeout(None)),
                Ok(minutes) => minutes.checked_mul(60).map(|seconds| Setting::ClaimTimeout(Some(seconds))),
                Err(_) => None,
            },
            ("show", []) => Some(Setting::Show),
            _ => None,
        }
    }

    pub fn apply(self, config: &mut IntakeConfig) {
        match self {
            Setting::Review(channel) => config.review_channel = Some(channel),
            Setting::Decision(channel) => config.decision_channel = channel,
            Setting::AcceptRoles(roles) => config.accept_roles = roles,
            Setting::RemoveRoles(roles) => config.remove_roles = roles,
            Setting::ClaimTimeout(seconds) => config.claim_timeout_secs = seconds,
            Setting::Show => {}
        }
    }
}

fn is_off(word: &str) -> bool {
    matches!(word.to_lowercase().as_str(), "off" | "none")
}

fn mention_channel(channel: Option<ChannelId>) -> String {
    channel.map(|channel| format!("<#{}>", channel)).unwrap_or("not set".to_string())
}

fn mention_roles(roles: &[RoleId]) -> String {
    if roles.is_empty() {
        return "none".to_string();
    }
    roles.iter()
        .map(|role| format!("<@&{}>", role))
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn describe(config: &IntakeConfig) -> Vec<(&'static str, String)> {
    vec![
        ("Review channel", mention_channel(config.review_channel)),
        ("Decision channel", mention_channel(config.decision_channel)),
        ("Roles on accept", mention_roles(&config.accept_roles)),
        ("Roles removed on accept", mention_roles(&config.remove_roles)),
        ("Claim timeout", config.claim_timeout_secs
            .map(|seconds| format!("{} minutes", seconds / 60))
            .unwrap_or("off".to_string())),
    ]
}


pub struct ApplySetupCommand;

impl Command for ApplySetupCommand {

    fn permission<'a>(&'a self, message: &'a MessageManager) -> BoxedFuture<'a, bool> {
        Box::pin(async move {
            message.is_admin().await
        })
    }

    fn define_usage(&self) -> UsageBuilder {
        UsageBuilder::new(nonempty!["apply-setup".to_string()])
            .add_constant("review")
            .add_required("channel")
            .new_usage()
            .add_constant("decision")
            .add_required("channel | off")
            .new_usage()
            .add_constant(vec!["accept-roles"])
            .add_optional("roles")
            .new_usage()
            .add_constant("remove-roles")
            .add_optional("roles")
            .new_usage()
            .add_constant("claim-timeout")
            .add_required("minutes | off")
            .new_usage()
            .add_constant("show")
    }

    fn run(&self, params: CommandParams) -> BoxedFuture<'_, ()> {
        Box::pin(
            async move {

                let message = &params.message;
                let guild = match message.get_guild() {
                    Some(guild) => guild,
                    None => return,
                };

                let setting = match Setting::parse(message.arguments()) {
                    Some(setting) => setting,
                    None => {
                        self.invalid_usage(message).await;
                        return;
                    }
                };

                if setting != Setting::Show {
                    let config = params.workflow.configs()
                        .update(guild, |config| setting.apply(config)).await;
                    let stored = IntakeDB::get_instance().lock().await
                        .store(guild, &config).await;
                    if let Err(err) = stored {
                        Logger::err_long("Failed to store intake config", &err);
                        message.reply_failure("The setting is active but could not be saved!").await;
                        return;
                    }
                }

                let config = params.workflow.configs().get(guild).await;
                let embed = MessageManager::create_embed(|mut embed| {
                    embed = embed.title("Application setup");
                    for (name, value) in describe(&config) {
                        embed = embed.field(name, value, false);
                    }
                    embed
                }).await;
                let _ = message.reply(embed).await;
            }
        )
    }

}


#[cfg(test)]
mod tests {
    use super::*;

    fn words(line: &str) -> Vec<String> {
        line.split_whitespace().map(|word| word.to_string()).collect()
    }

    #[test]
    fn channels_accept_mentions_and_ids() {
        assert_eq!(Setting::parse(&words("review <#123456789012345678>")),
            Some(Setting::Review(ChannelId::new(123456789012345678))));
        assert_eq!(Setting::parse(&words("decision 123456789012345678")),
            Some(Setting::Decision(Some(ChannelId::new(123456789012345678)))));
        assert_eq!(Setting::parse(&words("decision off")), Some(Setting::Decision(None)));
        assert_eq!(Setting::parse(&words("review")), None);
        assert_eq!(Setting::parse(&words("review #general")), None);
    }

    #[test]
    fn role_lists_may_be_empty_but_not_malformed() {
        assert_eq!(Setting::parse(&words("accept-roles <@&123456789012345678> 223456789012345678")),
            Some(Setting::AcceptRoles(vec![RoleId::new(123456789012345678), RoleId::new(223456789012345678)])));
        assert_eq!(Setting::parse(&words("remove-roles")), Some(Setting::RemoveRoles(Vec::new())));
        assert_eq!(Setting::parse(&words("accept-roles moderators")), None);
    }

    #[test]
    fn zero_disables_the_claim_timeout() {
        assert_eq!(Setting::parse(&words("claim-timeout 15")), Some(Setting::ClaimTimeout(Some(900))));
        assert_eq!(Setting::parse(&words("claim-timeout 0")), Some(Setting::ClaimTimeout(None)));
        assert_eq!(Setting::parse(&words("claim-timeout off")), Some(Setting::ClaimTimeout(None)));
        assert_eq!(Setting::parse(&words("claim-timeout soon")), None);
    }

    #[test]
    fn settings_change_one_field_each() {
        let mut config = IntakeConfig::default();
        Setting::Review(ChannelId::new(5)).apply(&mut config);
        Setting::ClaimTimeout(Some(120)).apply(&mut config);
        Setting::Show.apply(&mut config);
        assert_eq!(config, IntakeConfig {
            review_channel: Some(ChannelId::new(5)),
            claim_timeout_secs: Some(120),
            ..Default::default()
        });
        assert_eq!(describe(&config)[1], ("Decision channel", "not set".to_string()));
        assert_eq!(describe(&config)[4], ("Claim timeout", "2 minutes".to_string()));
    }
}
