pub mod batch;
pub mod bot;
pub mod config;
pub mod error;
pub mod external;
pub mod format;
pub mod ports;
pub mod router;

pub use batch::{BatchRunner, BatchSummary};
pub use bot::{IncomingMessage, Listener, VimHelpBot, PLUGIN_MANAGER_UNAVAILABLE};
pub use config::BotConfig;
pub use error::{code, Result, VimHelpError};
pub use format::{Formatter, PluginVerb};
pub use ports::{HelpSearch, PluginRepository, ResponseSink, RuntimePathProvider, UpdateInfo};
pub use router::{CommandRouter, Resolution};
