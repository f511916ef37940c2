
use serenity::all::Http;
use serenity::builder::{
    CreateActionRow,
    CreateButton,
    CreateEmbed,
    CreateEmbedFooter,
    CreateInteractionResponse,
    CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage,
    CreateMessage,
    EditMessage
};
use serenity::model::prelude::*;
use serenity::utils::CreateQuickModal;
use tokio::sync::Mutex;

use std::sync::Arc;
use std::time::Duration;

use crate::applications::model::NotificationRef;
use crate::applications::panel::{Question, QuestionKind};
use crate::applications::{Affordance, Answer, Content, InputCollector, MembershipMutator, Notifier};
use crate::utility::{BoxedFuture, Logger, Resolver};


const FORM_TIMEOUT: Duration = Duration::from_secs(900);

pub fn to_embed(content: &Content) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(&content.title)
        .colour(content.colour);
    if let Some(description) = &content.description {
        embed = embed.description(description);
    }
    for (name, value, inline) in content.fields.iter() {
        embed = embed.field(name, value, *inline);
    }
    if let Some(footer) = &content.footer {
        embed = embed.footer(CreateEmbedFooter::new(footer));
    }
    embed
}

pub fn to_components(affordances: &[Affordance]) -> Vec<CreateActionRow> {
    affordances.chunks(5)
        .map(|chunk| {
            let buttons = chunk.iter()
                .map(|affordance| CreateButton::new(&affordance.custom_id)
                    .label(&affordance.label)
                    .style(affordance.style)
                    .disabled(affordance.disabled))
                .collect();
            CreateActionRow::Buttons(buttons)
        })
        .collect()
}


/// Posts notifications as embeds with a row of buttons.
pub struct DiscordNotifier {
    http: Arc<Http>
}

impl DiscordNotifier {
    pub fn new(http: Arc<Http>) -> DiscordNotifier {
        DiscordNotifier { http }
    }
}

impl Notifier for DiscordNotifier {

    fn post<'a>(&'a self,
                destination: ChannelId,
                content: &'a Content,
                affordances: &'a [Affordance]) -> BoxedFuture<'a, anyhow::Result<NotificationRef>> {
        Box::pin(async move {
            let message = CreateMessage::new()
                .embed(to_embed(content))
                .components(to_components(affordances));
            let sent = destination.send_message(&*self.http, message).await?;
            Ok(NotificationRef { channel: sent.channel_id, message: sent.id })
        })
    }

    fn update<'a>(&'a self,
                  notification: NotificationRef,
                  content: &'a Content,
                  affordances: &'a [Affordance]) -> BoxedFuture<'a, anyhow::Result<()>> {
        Box::pin(async move {
            let edit = EditMessage::new()
                .embed(to_embed(content))
                .components(to_components(affordances));
            notification.channel.edit_message(&*self.http, notification.message, edit).await?;
            Ok(())
        })
    }
}


pub struct DiscordMembership {
    http: Arc<Http>
}

impl DiscordMembership {
    pub fn new(http: Arc<Http>) -> DiscordMembership {
        DiscordMembership { http }
    }
}

impl MembershipMutator for DiscordMembership {

    fn grant_role<'a>(&'a self, guild: GuildId, user: UserId, role: RoleId) -> BoxedFuture<'a, anyhow::Result<()>> {
        Box::pin(async move {
            self.http.add_member_role(guild, user, role, Some("Application accepted")).await?;
            Ok(())
        })
    }

    fn revoke_role<'a>(&'a self, guild: GuildId, user: UserId, role: RoleId) -> BoxedFuture<'a, anyhow::Result<()>> {
        Box::pin(async move {
            self.http.remove_member_role(guild, user, role, Some("Application accepted")).await?;
            Ok(())
        })
    }
}


/// Shows a panel's questions as a modal in response to the Apply button.
/// The submitted modal is deferred right away and answered through
/// `finish` once the application is stored.
pub struct ModalCollector<'a> {
    interaction: &'a ComponentInteraction,
    resolver: &'a Resolver,
    submitted: Mutex<Option<ModalInteraction>>
}

impl<'a> ModalCollector<'a> {

    pub fn new(interaction: &'a ComponentInteraction, resolver: &'a Resolver) -> ModalCollector<'a> {
        ModalCollector { interaction, resolver, submitted: Mutex::new(None) }
    }

    /// Whether the applicant got past the form, replies then go through `finish`.
    pub async fn is_submitted(&self) -> bool {
        self.submitted.lock().await.is_some()
    }

    pub async fn finish(&self, content: &str) {
        let submitted = self.submitted.lock().await;
        if let Some(modal) = submitted.as_ref() {
            let followup = CreateInteractionResponseFollowup::new()
                .content(content)
                .ephemeral(true);
            if let Err(err) = modal.create_followup(self.resolver, followup).await {
                Logger::warn_long("Failed to answer application form", &err.to_string());
            }
        }
    }
}

impl InputCollector for ModalCollector<'_> {

    fn collect<'a>(&'a self, title: &'a str, questions: &'a [Question]) -> BoxedFuture<'a, Option<Vec<Answer>>> {
        Box::pin(async move {

            let mut modal = CreateQuickModal::new(title).timeout(FORM_TIMEOUT);
            for question in questions.iter() {
                modal = match question.kind {
                    QuestionKind::Short => modal.short_field(question.label),
                    QuestionKind::Paragraph => modal.paragraph_field(question.label),
                };
            }

            let response = match self.interaction.quick_modal(self.resolver.ctx(), modal).await {
                Ok(Some(response)) => response,
                Ok(None) => return None,
                Err(err) => {
                    Logger::warn_long("Failed to open application form", &err.to_string());
                    return None;
                }
            };

            let defer = CreateInteractionResponse::Defer(
                CreateInteractionResponseMessage::new().ephemeral(true));
            if let Err(err) = response.interaction.create_response(self.resolver, defer).await {
                Logger::warn_long("Failed to defer application form", &err.to_string());
            }

            let answers = questions.iter()
                .zip(response.inputs.iter())
                .map(|(question, input)| Answer::new(question.label, input.trim()))
                .collect();
            *self.submitted.lock().await = Some(response.interaction);
            Some(answers)
        })
    }
}
