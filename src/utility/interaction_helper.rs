
use serenity::model::prelude::*;
use serenity::utils::CreateQuickModal;
use serenity::builder::{
    CreateActionRow,
    CreateEmbed,
    CreateInteractionResponse,
    CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage
};

use std::time::Duration;

use crate::utility::*;


const MODAL_TIMEOUT: Duration = Duration::from_secs(600);

/// Answers a single component interaction. Every reply is ephemeral, only
/// the clicking user sees it.
pub struct InteractionHelper<'a> {
    interaction: &'a ComponentInteraction,
    resolver: &'a Resolver
}

impl<'a> InteractionHelper<'a> {

    pub fn new(interaction: &'a ComponentInteraction, resolver: &'a Resolver) -> InteractionHelper<'a> {
        InteractionHelper { interaction, resolver }
    }

    pub fn user(&self) -> &User {
        &self.interaction.user
    }

    pub fn guild(&self) -> Option<GuildId> {
        self.interaction.guild_id
    }

    pub fn custom_id(&self) -> &str {
        &self.interaction.data.custom_id
    }

    pub async fn reply(&self, content: &str) {
        let response = CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .content(content)
                .ephemeral(true));
        if let Err(err) = self.interaction.create_response(self.resolver, response).await {
            Logger::warn_long("Failed to answer interaction", &err.to_string());
        }
    }

    /// Buys time for slow handlers, answer with `follow_up` afterwards.
    pub async fn defer(&self) -> bool {
        let response = CreateInteractionResponse::Defer(
            CreateInteractionResponseMessage::new().ephemeral(true));
        match self.interaction.create_response(self.resolver, response).await {
            Ok(_) => true,
            Err(err) => {
                Logger::warn_long("Failed to defer interaction", &err.to_string());
                false
            }
        }
    }

    pub async fn follow_up(&self, content: &str) {
        let followup = CreateInteractionResponseFollowup::new()
            .content(content)
            .ephemeral(true);
        if let Err(err) = self.interaction.create_followup(self.resolver, followup).await {
            Logger::warn_long("Failed to follow up interaction", &err.to_string());
        }
    }

    /// Follow-up carrying a private card with its own buttons.
    pub async fn follow_up_card(&self, content: &str, embed: CreateEmbed, components: Vec<CreateActionRow>) {
        let followup = CreateInteractionResponseFollowup::new()
            .content(content)
            .embed(embed)
            .components(components)
            .ephemeral(true);
        if let Err(err) = self.interaction.create_followup(self.resolver, followup).await {
            Logger::warn_long("Failed to follow up interaction", &err.to_string());
        }
    }

    /// Opens a one-field modal and returns the submitted text together with
    /// the modal interaction, which still needs an answer.
    pub async fn ask(&self, title: &str, label: &str) -> Option<(ModalInteraction, String)> {
        let modal = CreateQuickModal::new(title)
            .timeout(MODAL_TIMEOUT)
            .paragraph_field(label);
        let response = match self.interaction.quick_modal(self.resolver.ctx(), modal).await {
            Ok(response) => response?,
            Err(err) => {
                Logger::warn_long("Failed to open modal", &err.to_string());
                return None;
            }
        };
        let text = response.inputs.first()
            .map(|input| input.trim().to_string())
            .unwrap_or_default();
        Some((response.interaction, text))
    }

}

/// Answers a submitted modal ephemerally.
pub async fn reply_to_modal(resolver: &Resolver, modal: &ModalInteraction, content: &str) {
    let response = CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .content(content)
            .ephemeral(true));
    if let Err(err) = modal.create_response(resolver, response).await {
        Logger::warn_long("Failed to answer modal", &err.to_string());
    }
}
