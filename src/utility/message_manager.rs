
use serenity::builder::CreateEmbed;
use serenity::model::colour::Colour;
use serenity::model::prelude::*;

use std::time::Duration;

use crate::utility::*;
use crate::databases::*;


const DEFAULT_PREFIX: &str = "!";

#[derive(Clone)]
pub struct MessageManager {
    resolver: Resolver,
    raw_message: Message,
    prefix: Option<String>,
    command: Option<String>,
    words: Vec<String>
}

/// Splits `content` into the command word (without prefix) and the
/// remaining words. `None` if `content` does not start with `prefix`.
pub fn split_command(prefix: &str, content: &str) -> Option<(String, Vec<String>)> {
    let mut words = content.split_whitespace();
    let command = words.next()?.strip_prefix(prefix)?;
    if command.is_empty() {
        return None;
    }
    Some((command.to_lowercase(), words.map(|word| word.to_string()).collect()))
}

impl MessageManager {

    pub async fn new(resolver: Resolver, message: Message) -> MessageManager {
        let prefix = ConfigDB::get_instance().lock().await
            .get("command_prefix").await
            .map(|entry| entry.value)
            .unwrap_or(DEFAULT_PREFIX.to_string());

        let (command, words) = match split_command(&prefix, &message.content) {
            Some((command, words)) => (Some(command), words),
            None => (None, message.content.split_whitespace().map(|word| word.to_string()).collect()),
        };

        MessageManager {
            resolver,
            raw_message: message,
            prefix: command.as_ref().map(|_| prefix),
            command,
            words,
        }
    }

    pub fn is_command(&self) -> bool {
        self.command.is_some()
    }

    pub fn get_command(&self) -> Option<String> {
        self.command.clone()
    }

    pub fn get_prefix(&self) -> Option<String> {
        self.prefix.clone()
    }

    /// Words following the command.
    pub fn arguments(&self) -> &[String] {
        &self.words
    }

    pub fn argument(&self, index: usize) -> Option<&str> {
        self.words.get(index).map(|word| word.as_str())
    }

    pub async fn reply(&self, message: impl ToMessage) -> Result<Message> {
        let channel = self.get_channel();
        channel.send_message(&self.resolver, message.to_message()).await
            .map_err(|err| format!("Failed to send message: {}", err))
    }

    async fn reply_temporary(&self, embed: CreateEmbed) {

        // send message
        let sent_message = self.reply(embed).await;

        // delete message
        if let Ok(message) = sent_message {
            tokio::time::sleep(Duration::from_secs(5)).await;
            let _ = message.delete(&self.resolver).await;
        }
    }

    pub async fn reply_success(&self, context: &str) {
        let embed = MessageManager::create_embed(|embed| {
            embed
                .title("✅")
                .description(context)
        }).await;
        self.reply_temporary(embed).await;
    }

    pub async fn reply_failure(&self, context: &str) {
        let embed = MessageManager::create_embed(|embed| {
            embed
                .title("❌")
                .description(context)
        }).await;
        self.reply_temporary(embed).await;
    }

    pub async fn create_embed(fn_style: impl FnOnce(CreateEmbed) -> CreateEmbed) -> CreateEmbed {
        let color_primary = ConfigDB::get_instance().lock().await
            .get("color_primary").await
            .ok()
            .and_then(|entry| u32::from_str_radix(entry.value.trim_start_matches('#'), 16).ok())
            .map(Colour::new)
            .unwrap_or(Colour::BLURPLE);
        let embed = fn_style(CreateEmbed::default());
        embed.color(color_primary)
    }

    // ---- Basics ---- //

    pub fn get_channel(&self) -> ChannelId {
        self.raw_message.channel_id
    }

    pub fn get_guild(&self) -> Option<GuildId> {
        self.raw_message.guild_id
    }

    pub fn get_author(&self) -> &User {
        &self.raw_message.author
    }

    pub fn get_mentioned_users(&self) -> Vec<UserId> {
        self.words.iter()
            .filter_map(|word| RegexManager::mentioned_id(RegexManager::get_user_regex(), word))
            .map(UserId::new)
            .collect()
    }

    pub fn get_mentioned_channel(&self, index: usize) -> Option<ChannelId> {
        let word = self.argument(index)?;
        RegexManager::mentioned_id(RegexManager::get_channel_regex(), word).map(ChannelId::new)
    }

    // ---- Forwards to Resolver ---- //

    pub fn get_resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub async fn is_admin(&self) -> bool {
        self.resolver.is_admin(self.get_author()).await
    }

}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_need_the_prefix_and_a_name() {
        assert_eq!(split_command("!", "!Apply-Setup review <#1>"),
            Some(("apply-setup".to_string(), vec!["review".to_string(), "<#1>".to_string()])));
        assert_eq!(split_command("!", "hello !apply-setup"), None);
        assert_eq!(split_command("!", "! apply-setup"), None);
        assert_eq!(split_command("?", ""), None);
    }
}
