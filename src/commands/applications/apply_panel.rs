
use serenity::builder::CreateMessage;
use nonempty::nonempty;

use crate::applications::{find_panel, render, PANELS};
use crate::commands::command::*;
use crate::utility::*;
use crate::utility::discord_services::{to_components, to_embed};


pub struct ApplyPanelCommand;

impl Command for ApplyPanelCommand {

    fn permission<'a>(&'a self, message: &'a MessageManager) -> BoxedFuture<'a, bool> {
        Box::pin(async move {
            message.is_admin().await
        })
    }

    fn define_usage(&self) -> UsageBuilder {
        let panels = PANELS.iter()
            .map(|panel| panel.id)
            .collect::<Vec<&str>>()
            .join(" | ");
        UsageBuilder::new(nonempty!["apply-panel".to_string()])
            .add_required(panels.as_str())
            .add_optional("channel")
    }

    fn run(&self, params: CommandParams) -> BoxedFuture<'_, ()> {
        Box::pin(
            async move {

                let message = &params.message;
                let panel = match message.argument(0).and_then(find_panel) {
                    Some(panel) => panel,
                    None => {
                        self.invalid_usage(message).await;
                        return;
                    }
                };
                let channel = match message.argument(1) {
                    Some(_) => match message.get_mentioned_channel(1) {
                        Some(channel) => channel,
                        None => {
                            self.invalid_usage(message).await;
                            return;
                        }
                    },
                    None => message.get_channel(),
                };

                let (content, affordances) = render::panel_card(panel);
                let card = CreateMessage::new()
                    .embed(to_embed(&content))
                    .components(to_components(&affordances));
                match channel.send_message(message.get_resolver(), card).await {
                    Ok(_) => {
                        Logger::info_long("Posted application panel", &format!("{} in {}", panel.id, channel));
                        if channel != message.get_channel() {
                            message.reply_success(&format!("Posted the {} panel in <#{}>.", panel.id, channel)).await;
                        }
                    },
                    Err(err) => {
                        Logger::err_long("Failed to post application panel", &err.to_string());
                        message.reply_failure("Could not post the panel in that channel!").await;
                    }
                }
            }
        )
    }

}
