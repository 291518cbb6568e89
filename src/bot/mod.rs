pub mod responder;
pub mod types;

pub use responder::BotResponder;
pub use types::{BotActions, BotReply, BOT_REPLIES};
