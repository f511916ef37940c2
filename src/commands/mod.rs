
pub mod command_manager;

pub mod command;
pub use command::{Command, CommandParams};

// ---- src/commands/applications/ ---- //

pub mod applications;

pub use applications::apply_setup::ApplySetupCommand;
pub use applications::apply_panel::ApplyPanelCommand;
pub use applications::apply_release::ApplyReleaseCommand;
pub use applications::history::ApplicationsCommand;
