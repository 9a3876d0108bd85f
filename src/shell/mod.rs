//! Web shell window
//!
//! - `WebWindow` - one window, one site, one browsing profile
//! - `ShellConfig` / `BrowsingProfile` - configuration and storage layout
//! - Collaborator traits for the engine, native window, save dialog,
//!   desktop URL handler and process lifecycle

mod collaborators;
mod config;
mod window;

pub use collaborators::{
    AppLifecycle, BrowserEngine, Collaborators, DesktopServices, ProcessLifecycle, SaveDialog,
    WindowSurface,
};
pub use config::{BrowsingProfile, ShellConfig, OPEN_AT_STARTUP_FLAG};
pub use window::{EventResponse, WebWindow};
pub use crate::events::DownloadAction;
