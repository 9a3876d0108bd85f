//! Events Module
//!
//! Engine and window notifications, delivered through explicit
//! registration instead of signal wiring.
//!
//! # Example
//!
//! ```ignore
//! use webshell::events::{EventKind, ShellEvent};
//!
//! window.on_event(EventKind::IconChanged, |event: &ShellEvent| {
//!     if let ShellEvent::IconChanged { icon_url } = event {
//!         tray.set_icon_from(icon_url.as_ref());
//!     }
//! });
//! ```
//!
//! # Event Kinds
//!
//! | Kind | Sent when | Shell action before handlers run |
//! |------|-----------|----------------------------------|
//! | `PermissionRequested` | page asks for a feature | none |
//! | `PermissionResolved` | shell answered the engine | state reported |
//! | `DownloadRequested` | download starts | save dialog; event carries the answer |
//! | `FullScreenRequested` | page toggles fullscreen | accepted, window resized |
//! | `NewWindowRequested` | page opens a window | URL opened externally |
//! | `IconChanged` / `TitleChanged` | page metadata changes | none |
//! | `Notification` | page posts a notification | none |
//! | `CloseRequested` | user closes the window | window hidden |

mod registry;
mod types;

pub use registry::{EventHandler, EventMatcher, EventRegistry};
pub use types::{DownloadAction, EngineEvent, EventKind, ShellEvent, WebNotification};
