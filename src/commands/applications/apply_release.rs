
use nonempty::nonempty;

use crate::commands::command::*;
use crate::utility::*;


/// Frees a pending application from an abandoned claim.
pub struct ApplyReleaseCommand;

impl Command for ApplyReleaseCommand {

    fn permission<'a>(&'a self, message: &'a MessageManager) -> BoxedFuture<'a, bool> {
        Box::pin(async move {
            message.is_admin().await
        })
    }

    fn define_usage(&self) -> UsageBuilder {
        UsageBuilder::new(nonempty!["apply-release".to_string(), "unclaim".to_string()])
            .add_required("user")
    }

    fn run(&self, params: CommandParams) -> BoxedFuture<'_, ()> {
        Box::pin(
            async move {

                let message = &params.message;
                let applicant = match message.get_mentioned_users().first() {
                    Some(applicant) => *applicant,
                    None => {
                        self.invalid_usage(message).await;
                        return;
                    }
                };

                let reference = match params.workflow.pending_for(applicant).await {
                    Some(reference) => reference,
                    None => {
                        message.reply_failure(&format!("<@{}> has no pending application.", applicant)).await;
                        return;
                    }
                };

                match params.workflow.release(reference, message.get_author().id, true).await {
                    Ok(Some(previous)) => {
                        Logger::info_long("Released claim", &format!("{} (held by {})", reference, previous));
                        message.reply_success(&format!("Released <@{}>'s claim on the application.", previous)).await;
                    },
                    Ok(None) => message.reply_failure("Nobody is reviewing this application.").await,
                    Err(err) => message.reply_failure(&err.to_string()).await,
                }
            }
        )
    }

}
