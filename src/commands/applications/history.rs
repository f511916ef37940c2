
use nonempty::nonempty;

use crate::applications::ApplicationStatus;
use crate::commands::command::*;
use crate::utility::*;
use crate::databases::*;


fn status_symbol(status: &str) -> &'static str {
    match status.parse::<ApplicationStatus>() {
        Ok(ApplicationStatus::Accepted) => "✅",
        Ok(ApplicationStatus::Rejected) => "❌",
        _ => "⏳",
    }
}

pub fn history_line(log: &DecisionLog) -> String {
    format!("{} <t:{}> `>` {} ({}) by <@{}>",
        status_symbol(&log.status),
        log.timestamp,
        log.status,
        log.panel,
        log.reviewer_id)
}

const HISTORY_LINES: usize = 20;
// embed descriptions hold 4096 characters, the rest is left for the
// mention and the omitted note
const DESCRIPTION_BUDGET: usize = 3950;

/// Joins the newest lines that fit, oldest first, noting how many were left out.
pub fn history_description(lines: &[String]) -> String {
    let mut kept = Vec::new();
    let mut used = 0;
    for line in lines.iter().rev().take(HISTORY_LINES) {
        let length = line.chars().count() + 1;
        if used + length > DESCRIPTION_BUDGET {
            break;
        }
        used += length;
        kept.push(line.as_str());
    }
    kept.reverse();

    let omitted = lines.len() - kept.len();
    let mut description = kept.join("\n");
    if omitted > 0 {
        description = format!("*{} older entries not shown*\n{}", omitted, description);
    }
    description
}


pub struct ApplicationsCommand;

impl Command for ApplicationsCommand {

    fn permission<'a>(&'a self, message: &'a MessageManager) -> BoxedFuture<'a, bool> {
        Box::pin(async move {
            message.is_admin().await
        })
    }

    fn define_usage(&self) -> UsageBuilder {
        UsageBuilder::new(nonempty!["applications".to_string()])
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

                let logs = DecisionsDB::get_instance().lock().await
                    .get_all(&applicant.to_string()).await;
                let logs = match logs {
                    Ok(logs) => logs,
                    Err(err) => {
                        Logger::err_long("Failed to read decision logs", &err);
                        message.reply_failure("Could not read the application history!").await;
                        return;
                    }
                };

                let mut description = logs.iter()
                    .map(history_line)
                    .collect::<Vec<String>>();
                if let Some(reference) = params.workflow.pending_for(applicant).await {
                    let status = match params.workflow.snapshot(reference).await {
                        Some((_, lock)) if lock.is_held() => "in review",
                        _ => "waiting for a reviewer",
                    };
                    description.push(format!("⏳ pending `>` {}", status));
                }
                if description.is_empty() {
                    description.push("No applications yet.".to_string());
                }

                let embed = MessageManager::create_embed(|embed| {
                    embed
                        .title("Application history")
                        .description(format!("<@{}>\n\n{}", applicant, history_description(&description)))
                }).await;
                if let Err(err) = message.reply(embed).await {
                    Logger::err_long("Failed to send application history", &err);
                }
            }
        )
    }

}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_lines_show_outcome_and_reviewer() {
        let mut log = DecisionLog::new("a".into(), "7".into(), "Accepted".into(), "staff".into());
        log.timestamp = 1700000000;
        assert_eq!(history_line(&log), "✅ <t:1700000000> `>` Accepted (staff) by <@7>");
        log.status = "Rejected".to_string();
        assert!(history_line(&log).starts_with("❌"));
    }

    #[test]
    fn long_history_keeps_the_newest_lines() {
        let lines = (0..50).map(|i| format!("line {}", i)).collect::<Vec<String>>();
        let description = history_description(&lines);
        assert!(description.starts_with("*30 older entries not shown*\nline 30\n"));
        assert!(description.ends_with("line 49"));

        let short = vec!["only".to_string()];
        assert_eq!(history_description(&short), "only");
    }

    #[test]
    fn oversized_lines_stay_within_embed_limit() {
        let lines = (0..20).map(|i| format!("{} {}", i, "x".repeat(500))).collect::<Vec<String>>();
        let description = history_description(&lines);
        assert!(description.chars().count() + "<@18446744073709551615>\n\n".len() <= 4096);
        assert!(description.ends_with(&lines[19]));
        assert!(description.starts_with("*13 older entries not shown*"));
    }
}
