
/// Discord modals hold at most five text inputs.
pub const MAX_QUESTIONS: usize = 5;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum QuestionKind {
    Short,
    Paragraph,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Question {
    pub label: &'static str,
    pub kind: QuestionKind,
}

#[derive(Debug)]
pub struct Panel {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub questions: &'static [Question],
}

const fn short(label: &'static str) -> Question {
    Question { label, kind: QuestionKind::Short }
}

const fn paragraph(label: &'static str) -> Question {
    Question { label, kind: QuestionKind::Paragraph }
}

pub static PANELS: &[Panel] = &[
    Panel {
        id: "staff",
        title: "Staff application",
        description: "Want to help moderate the server? Press the button below and answer a few questions.",
        questions: &[
            short("Roblox username"),
            short("Age"),
            short("Timezone"),
            paragraph("Why do you want to join the team?"),
            paragraph("Previous moderation experience"),
        ],
    },
    Panel {
        id: "member",
        title: "Member application",
        description: "Apply for membership by pressing the button below.",
        questions: &[
            short("Roblox username"),
            short("How did you find us?"),
            paragraph("Tell us about yourself"),
        ],
    },
];

pub fn find_panel(id: &str) -> Option<&'static Panel> {
    PANELS.iter().find(|panel| panel.id == id)
}
