
pub mod message_manager;
pub mod traits;
pub mod usage_builder;
pub mod mixed;
pub mod resolver;
pub mod logger;
pub mod interaction_helper;
pub mod discord_services;

pub use message_manager::MessageManager;
pub use traits::{Singleton, ToList, ToMessage};
pub use usage_builder::UsageBuilder;
pub use mixed::{BoxedFuture, Result, RegexManager};
pub use resolver::Resolver;
pub use logger::Logger;
pub use interaction_helper::{InteractionHelper, reply_to_modal};
pub use discord_services::{DiscordMembership, DiscordNotifier, ModalCollector, to_components, to_embed};
