//! Command handlers for the Normas CLI.

pub mod ask;
pub mod chat;
pub mod norms;
mod output;

pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use norms::NormsCommand;
