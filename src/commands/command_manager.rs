
use std::sync::Arc;

use crate::applications::ApplicationReviewWorkflow;
use crate::commands::*;
use crate::utility::*;


pub struct CommandManager {
    commands: Vec<Box<dyn Command>>,
}

impl CommandManager {

    pub fn new() -> CommandManager {
        CommandManager {
            commands: vec![
                Box::new(ApplySetupCommand),
                Box::new(ApplyPanelCommand),
                Box::new(ApplyReleaseCommand),
                Box::new(ApplicationsCommand),
            ],
        }
    }

    // note: only execute this method, when message.is_command() is true
    pub async fn execute(&self, message: MessageManager, workflow: Arc<ApplicationReviewWorkflow>) {

        let command = match self.commands.iter().find(|command| command.is_triggered_by(&message)) {
            Some(command) => command,
            None => return,
        };

        if message.get_guild().is_none() {
            return;
        }

        if !command.permission(&message).await {
            message.reply_failure("You are not allowed to use this command!").await;
            return;
        }

        #[cfg(feature = "debug")]
        Logger::debug("Command", &format!("{} by {}", command.get_triggers().head, message.get_author().id));

        command.run(CommandParams::new(message, workflow)).await;
    }

}
