
pub mod model;
pub mod error;
pub mod config;
pub mod panel;
pub mod custom_id;
pub mod render;
pub mod services;
pub mod workflow;

pub use model::{Answer, ApplicantId, Application, ApplicationRef, ApplicationStatus, ReviewerId};
pub use error::ReviewError;
pub use config::IntakeConfig;
pub use panel::{Panel, find_panel, PANELS};
pub use custom_id::{ComponentId, ReviewAction};
pub use render::{Affordance, Content, Viewer};
pub use services::{InputCollector, MembershipMutator, Notifier, RoleOutcome};
pub use workflow::{ApplicationReviewWorkflow, ClaimOutcome, DecisionReport};
