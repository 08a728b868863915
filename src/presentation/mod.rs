pub mod config;
pub mod console;
pub mod handlers;
pub mod pipeline;
pub mod router;
pub mod state;

pub use config::{Environment, Settings, SettingsError};
pub use console::{emit_to_writer, run_console_chat};
pub use router::create_router;
pub use state::AppState;
