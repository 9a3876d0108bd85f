pub mod core;
pub mod permissions;

// Engine and window notifications
pub mod events;

// The window and its collaborators
pub mod shell;

pub mod logging;

pub use crate::core::{ShellError, ShellResult};
pub use permissions::{Decision, Feature, PermissionManager, PermissionState};
pub use shell::{ShellConfig, WebWindow};
