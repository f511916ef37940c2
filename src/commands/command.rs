
use serenity::builder::CreateEmbedFooter;
use nonempty::NonEmpty;

use std::sync::Arc;

use crate::applications::ApplicationReviewWorkflow;
use crate::utility::*;


pub struct CommandParams {
    pub message: MessageManager,
    pub workflow: Arc<ApplicationReviewWorkflow>
}

impl CommandParams {
    pub fn new(message: MessageManager, workflow: Arc<ApplicationReviewWorkflow>) -> Self {
        Self { message, workflow }
    }
}

pub trait Command: Send + Sync {

    fn is_triggered_by(&self, message: &MessageManager) -> bool {
        match message.get_command() {
            Some(word) => self.get_triggers().iter().any(|trigger| *trigger == word),
            None => false,
        }
    }

    fn permission<'a>(&'a self, _message: &'a MessageManager) -> BoxedFuture<'a, bool> {
        Box::pin(async move { true })
    }

    fn run(&self, params: CommandParams) -> BoxedFuture<'_, ()>;

    fn define_usage(&self) -> UsageBuilder;

    fn display_usage<'a>(&'a self, message: &'a MessageManager, title: String) -> BoxedFuture<'a, ()> {
        Box::pin(
            async move {
                let prefix = message.get_prefix().unwrap_or_default();
                let usage = self.define_usage().build(&prefix);
                let embed = MessageManager::create_embed(|embed| {
                    embed
                        .title(title)
                        .description(usage)
                        .footer(CreateEmbedFooter::new(
                            "Syntax Legend: <> = required, [] = optional",
                        ))
                }).await;
                let _ = message.reply(embed).await;
            }
        )
    }

    fn invalid_usage<'a>(&'a self, message: &'a MessageManager) -> BoxedFuture<'a, ()> {
        Box::pin(
            async move { self.display_usage(message, "Invalid Usage!".to_string()).await }
        )
    }

    fn get_triggers(&self) -> NonEmpty<String> {
        self.define_usage().triggers
    }

}
