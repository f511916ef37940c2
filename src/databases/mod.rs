
pub mod database;
pub mod wrappers;

pub use database::{Database, DBEntry, DB};
pub use wrappers::DatabaseWrapper;
pub use wrappers::{ConfigDB, IntakeDB, DecisionsDB, DecisionLog};
