//! Bot module - state and the HTTP bridge to the host bot.

pub mod bridge;
pub mod dispatcher;
mod runtime;

pub use dispatcher::AppState;
pub use runtime::run;
