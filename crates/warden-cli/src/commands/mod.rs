//! Built-in management commands.
//!
//! Each command implements the
//! [`ManagementCommand`](crate::command::ManagementCommand) trait and builds
//! its [`PasswordEncoder`](warden_auth::PasswordEncoder) from the loaded
//! settings.

pub mod algorithms;
pub mod checkpassword;
pub mod encodepassword;

pub use algorithms::AlgorithmsCommand;
pub use checkpassword::CheckpasswordCommand;
pub use encodepassword::EncodepasswordCommand;

use crate::command::CommandRegistry;

/// Registers all built-in management commands into the given registry.
pub fn register_builtin_commands(registry: &mut CommandRegistry) {
    registry.register(Box::new(AlgorithmsCommand));
    registry.register(Box::new(EncodepasswordCommand));
    registry.register(Box::new(CheckpasswordCommand));
}
