//! Prompt system for Docent.
//!
//! - Built-in grounded-answer template ([`grounded`])
//! - YAML prompt overrides under `.docent/prompts/`
//! - Handlebars rendering with escaping disabled

pub mod builder;
pub mod grounded;
pub mod loader;
pub mod types;

pub use builder::{build_prompt, render_template};
pub use grounded::{default_definition, REFUSAL_SENTENCE};
pub use loader::{list_prompts, load_prompt, resolve_prompt, validate_prompt};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition};
