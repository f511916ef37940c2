
use serenity::async_trait;
use serenity::model::application::{ComponentInteraction, Interaction};
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;

use std::sync::Arc;

use crate::applications::*;
use crate::commands::command_manager::CommandManager;
use crate::utility::*;
use crate::databases::*;


pub struct Handler {
    command_manager: CommandManager,
    workflow: Arc<ApplicationReviewWorkflow>,
}

impl Handler {

    pub fn new(command_manager: CommandManager, workflow: Arc<ApplicationReviewWorkflow>) -> Handler {
        Handler {
            command_manager,
            workflow,
        }
    }

    async fn apply(&self, helper: &InteractionHelper<'_>, collector: &ModalCollector<'_>, panel_id: &str) {

        let guild = match helper.guild() {
            Some(guild) => guild,
            None => return helper.reply("Applications only work inside a server.").await,
        };
        let panel = match find_panel(panel_id) {
            Some(panel) => panel,
            None => return helper.reply("This application panel no longer exists.").await,
        };

        let result = self.workflow.submit_with(collector, guild, panel, helper.user().id).await;
        let answer = match result {
            Ok(Some(reference)) => {
                Logger::info_long("Application submitted", &format!("{} ({})", reference, panel.id));
                "Your application was submitted. You will hear from us soon!".to_string()
            },
            Ok(None) => return,
            Err(err) => err.to_string(),
        };

        // the form was shown, so the interaction is spent and only the
        // modal submission can be answered
        if collector.is_submitted().await {
            collector.finish(&answer).await;
        } else {
            helper.reply(&answer).await;
        }
    }

    async fn claim(&self, helper: &InteractionHelper<'_>, reference: ApplicationRef) {
        helper.defer().await;
        let reviewer = helper.user().id;
        let outcome = match self.workflow.claim(reference, reviewer).await {
            Ok(outcome) => outcome,
            Err(err) => return helper.follow_up(&err.to_string()).await,
        };
        if let ClaimOutcome::Reclaimed { previous } = outcome {
            Logger::info_long("Reclaimed expired claim",
                &format!("{} from {} to {}", reference, previous, reviewer));
        }

        // the claimant gets the card from their own side
        let answer = claim_reply(outcome, reference.applicant_id);
        match self.workflow.reviewer_card(reference, reviewer).await {
            Some((content, affordances)) =>
                helper.follow_up_card(&answer, to_embed(&content), to_components(&affordances)).await,
            None => helper.follow_up(&answer).await,
        }
    }

    async fn decide(&self, helper: &InteractionHelper<'_>, reference: ApplicationRef, action: ReviewAction) {
        helper.defer().await;
        let reviewer = helper.user().id;
        let result = match action {
            ReviewAction::Accept => self.workflow.accept(reference, reviewer).await,
            _ => self.workflow.reject(reference, reviewer).await,
        };
        let report = match result {
            Ok(report) => report,
            Err(err) => return helper.follow_up(&err.to_string()).await,
        };

        let log = DecisionLog::from_report(&report, reviewer);
        let stored = DecisionsDB::get_instance().lock().await
            .append(&reference.applicant_id.to_string(), &log.to_value()).await;
        if let Err(err) = stored {
            Logger::err_long("Failed to log decision", &err);
        }

        helper.follow_up(&decision_reply(&report)).await;
    }

    async fn request_info(&self, helper: &InteractionHelper<'_>, resolver: &Resolver, reference: ApplicationRef) {
        let reviewer = helper.user().id;

        // cheap check first, a modal cannot be followed by a denial
        if let Err(err) = self.workflow.check_holder(reference, reviewer).await {
            return helper.reply(&err.to_string()).await;
        }

        let (modal, comment) = match helper.ask("Request more information", "What should the applicant add?").await {
            Some(submitted) => submitted,
            None => return,
        };
        if comment.is_empty() {
            return reply_to_modal(resolver, &modal, "The question must not be empty.").await;
        }

        let answer = match self.workflow.request_info(reference, reviewer, &comment).await {
            Ok(_) => format!("Asked <@{}> for more information.", reference.applicant_id),
            Err(err) => err.to_string(),
        };
        reply_to_modal(resolver, &modal, &answer).await;
    }

    async fn component(&self, ctx: Context, interaction: ComponentInteraction) {

        // foreign buttons are none of our business
        let component = match ComponentId::parse(&interaction.data.custom_id) {
            Some(component) => component,
            None => return,
        };

        let resolver = Resolver::new(ctx, interaction.guild_id);
        let helper = InteractionHelper::new(&interaction, &resolver);

        #[cfg(feature = "debug")]
        let logstr = &format!("{} by {}", helper.custom_id(), helper.user().id);
        #[cfg(feature = "debug")]
        Logger::info_long("Start", logstr);

        match component {
            ComponentId::Apply(panel_id) => {
                let collector = ModalCollector::new(&interaction, &resolver);
                self.apply(&helper, &collector, &panel_id).await;
            },
            ComponentId::Review(ReviewAction::Claim, reference) => self.claim(&helper, reference).await,
            ComponentId::Review(ReviewAction::Info, reference) => self.request_info(&helper, &resolver, reference).await,
            ComponentId::Review(action, reference) => self.decide(&helper, reference, action).await,
        }

        #[cfg(feature = "debug")]
        Logger::info_long("End", logstr);
    }

}

fn claim_reply(outcome: ClaimOutcome, applicant: ApplicantId) -> String {
    match outcome {
        ClaimOutcome::Claimed => format!("You are now reviewing <@{}>'s application.", applicant),
        ClaimOutcome::AlreadyHeld => "You are already reviewing this application.".to_string(),
        ClaimOutcome::Reclaimed { previous } =>
            format!("<@{}> had been idle too long, you are now reviewing <@{}>'s application.", previous, applicant),
    }
}

fn decision_reply(report: &DecisionReport) -> String {
    let mut reply = format!("<@{}>'s application was {}.",
        report.reference.applicant_id,
        report.status.to_string().to_lowercase());

    let failed = report.failed_roles();
    if !failed.is_empty() {
        let roles = failed.iter()
            .map(|outcome| format!("<@&{}>", outcome.role))
            .collect::<Vec<String>>()
            .join(" ");
        reply.push_str(&format!("\nCould not update these roles, please fix them by hand: {}", roles));
    }
    if !report.notice_posted {
        reply.push_str("\nNo decision notice was posted.");
    }
    reply
}

#[async_trait]
impl EventHandler for Handler {

    async fn ready(&self, _ctx: Context, ready: Ready) {

        Logger::info_long("Connected as", &ready.user.name);

        let configs = IntakeDB::get_instance().lock().await.load_all().await;
        let count = configs.len();
        for (guild, config) in configs.into_iter() {
            self.workflow.configs().set(guild, config).await;
        }
        Logger::info_long("Loaded intake configs", &count.to_string());
    }

    async fn message(&self, ctx: Context, msg: Message) {

        if msg.author.bot {
            return;
        }

        let resolver = Resolver::new(ctx, msg.guild_id);
        let message = MessageManager::new(resolver, msg).await;

        #[cfg(feature = "commands")]
        if message.is_command() {
            self.command_manager.execute(message, Arc::clone(&self.workflow)).await;
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Component(component) = interaction {
            self.component(ctx, component).await;
        }
    }

}
