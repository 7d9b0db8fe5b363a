//! Prompt system for Normas.
//!
//! Every generation call in the retrieval pipeline renders one of a fixed set
//! of prompts:
//! - Built-in Portuguese Handlebars templates (see [`defaults`])
//! - Optional workspace overrides in `.normas/prompts/<id>.yml`
//! - A [`PromptLibrary`] that compiles the resolved set once

mod builder;
pub mod defaults;
pub mod library;
pub mod loader;
pub mod types;

pub use defaults::{builtin_prompt, ids, BUILTIN_PROMPT_IDS};
pub use library::PromptLibrary;
pub use loader::{list_prompts, load_prompt};
pub use types::{PromptDefinition, PromptOutputSpec};
