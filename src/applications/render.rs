
use serenity::model::application::ButtonStyle;
use serenity::model::colour::Colour;

use crate::applications::custom_id::{ComponentId, ReviewAction};
use crate::applications::model::*;
use crate::applications::panel::Panel;


const FIELD_LIMIT: usize = 1024;

/// Embed-like content of a notification, independent of any client library.
#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    pub title: String,
    pub description: Option<String>,
    pub fields: Vec<(String, String, bool)>,
    pub footer: Option<String>,
    pub colour: Colour,
}

impl Content {

    fn new(title: impl Into<String>, colour: Colour) -> Content {
        Content {
            title: title.into(),
            description: None,
            fields: Vec::new(),
            footer: None,
            colour,
        }
    }

    fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push((name.into(), clip(value.into()), inline));
        self
    }

    fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields.iter()
            .find(|(field, _, _)| field == name)
            .map(|(_, value, _)| value.as_str())
    }
}

/// One interactive button.
#[derive(Debug, Clone, PartialEq)]
pub struct Affordance {
    pub custom_id: String,
    pub label: String,
    pub style: ButtonStyle,
    pub disabled: bool,
}

impl Affordance {
    pub fn action(&self) -> Option<ReviewAction> {
        match ComponentId::parse(&self.custom_id) {
            Some(ComponentId::Review(action, _)) => Some(action),
            _ => None,
        }
    }
}

/// Whose perspective a review card is rendered for. The shared card in the
/// review channel is `Public`: its decision buttons follow the holder, every
/// other reviewer is turned away server side. A claimant additionally gets
/// a private `Reviewer` copy.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Viewer {
    Public,
    Reviewer(ReviewerId),
}

fn clip(value: String) -> String {
    if value.chars().count() <= FIELD_LIMIT {
        return value;
    }
    let mut clipped: String = value.chars().take(FIELD_LIMIT - 1).collect();
    clipped.push('…');
    clipped
}

fn status_line(application: &Application, state: ReviewState) -> String {
    match state {
        ReviewState::Unclaimed => "Waiting for a reviewer".to_string(),
        ReviewState::Claimed(holder) => format!("In review by <@{}>", holder),
        ReviewState::Decided(status) => match application.decided_by {
            Some(reviewer) => format!("{} by <@{}>", status, reviewer),
            None => status.to_string(),
        },
    }
}

fn claim_label(state: ReviewState, viewer: Viewer) -> &'static str {
    match (state, viewer) {
        (ReviewState::Unclaimed, _) => "Claim",
        (ReviewState::Claimed(holder), Viewer::Reviewer(reviewer)) if holder == reviewer => "Claimed by you",
        (ReviewState::Claimed(_), Viewer::Reviewer(_)) => "Someone else is reviewing",
        (ReviewState::Claimed(_), Viewer::Public) => "In review",
        (ReviewState::Decided(_), _) => "Closed",
    }
}

pub fn review_card(application: &Application, lock: &ReviewLock, viewer: Viewer) -> (Content, Vec<Affordance>) {

    let state = ReviewState::of(application.status, lock);
    let colour = match state {
        ReviewState::Unclaimed => Colour::GOLD,
        ReviewState::Claimed(_) => Colour::BLUE,
        ReviewState::Decided(ApplicationStatus::Accepted) => Colour::DARK_GREEN,
        ReviewState::Decided(_) => Colour::RED,
    };

    let mut content = Content::new(format!("Application ({})", application.panel), colour)
        .description(format!("Submitted by <@{}> <t:{}:R>", application.applicant_id, application.submitted_at));
    for answer in application.answers.iter() {
        content = content.field(&answer.question, &answer.response, false);
    }
    let content = content
        .field("Status", status_line(application, state), false)
        .footer(format!("Applicant ID: {}", application.applicant_id));

    // decisions follow the lock, the shared card acts on behalf of the holder
    let may_decide = match (state, viewer) {
        (ReviewState::Claimed(_), Viewer::Public) => true,
        (ReviewState::Claimed(holder), Viewer::Reviewer(reviewer)) => holder == reviewer,
        _ => false,
    };

    let reference = application.reference();
    let button = |action: ReviewAction, label: &str, style: ButtonStyle, disabled: bool| Affordance {
        custom_id: ComponentId::Review(action, reference).encode(),
        label: label.to_string(),
        style,
        disabled,
    };
    let affordances = vec![
        button(ReviewAction::Claim, claim_label(state, viewer), ButtonStyle::Primary, state != ReviewState::Unclaimed),
        button(ReviewAction::Accept, "Accept", ButtonStyle::Success, !may_decide),
        button(ReviewAction::Reject, "Reject", ButtonStyle::Danger, !may_decide),
        button(ReviewAction::Info, "Request info", ButtonStyle::Secondary, !may_decide),
    ];

    (content, affordances)
}

pub fn decision_notice(application: &Application, reviewer: ReviewerId) -> Content {
    let (title, colour) = match application.status {
        ApplicationStatus::Accepted => ("Application accepted", Colour::DARK_GREEN),
        _ => ("Application rejected", Colour::RED),
    };
    Content::new(title, colour)
        .description(format!("<@{}>'s application ({}) was {} by <@{}>.",
            application.applicant_id,
            application.panel,
            application.status.to_string().to_lowercase(),
            reviewer))
        .field("Applicant", format!("<@{}>", application.applicant_id), true)
        .field("Reviewer", format!("<@{}>", reviewer), true)
}

pub fn info_notice(application: &Application, reviewer: ReviewerId, comment: &str) -> Content {
    Content::new("More information needed", Colour::ORANGE)
        .description(format!("<@{}>, a reviewer has a question about your application.", application.applicant_id))
        .field("Comment", comment, false)
        .field("Reviewer", format!("<@{}>", reviewer), true)
}

pub fn panel_card(panel: &Panel) -> (Content, Vec<Affordance>) {
    let content = Content::new(panel.title, Colour::BLURPLE)
        .description(panel.description)
        .footer(format!("{} questions", panel.questions.len()));
    let affordances = vec![Affordance {
        custom_id: ComponentId::Apply(panel.id.to_string()).encode(),
        label: "Apply".to_string(),
        style: ButtonStyle::Success,
        disabled: false,
    }];
    (content, affordances)
}
