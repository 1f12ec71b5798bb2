//! Collaborators that shell out to `vim` and `git`.

pub mod plugin_manager;
pub mod process;
pub mod vim;

pub use plugin_manager::{PluginManager, PluginSource};
pub use process::{run_command, CommandOutput};
pub use vim::VimHelp;
