//! Host lifecycle event handlers.

pub mod thread;

pub use thread::{TemplateVariables, ThreadHooks};
