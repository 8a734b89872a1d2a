//! Prompt template loading and rendering.

pub mod render;
pub mod template;

pub use render::{placeholders, substitute, PromptRenderer, RenderedPrompt, Variables};
pub use template::{PromptTemplate, TemplateStore};
