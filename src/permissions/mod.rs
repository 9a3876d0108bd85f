//! Browser feature permissions
//!
//! This module answers "has the user granted capability X?" for a browsing
//! profile and records new answers durably.
//!
//! - `PermissionManager`: one decision per `Feature`, persisted to
//!   `<profile_dir>/permissions.state` on every change
//! - `resolve_feature_request` / `resolve_with_prompt`: turn an engine
//!   request into the `PermissionState` reported back for the origin
//!
//! ## File format
//!
//! ```text
//! # permissions, written 2026-01-01T00:00:00+00:00
//! camera=granted
//! notifications=denied
//! ```
//!
//! Unset features have no line. Unknown feature names are ignored on load.
//!
//! ## Example
//!
//! ```rust,ignore
//! use webshell::permissions::{Feature, Decision, PermissionManager};
//!
//! let mut perms = PermissionManager::for_profile_dir(profile.storage_dir());
//! perms.set(Feature::Microphone, Decision::Granted)?;
//! assert_eq!(perms.get(Feature::Camera), Decision::Unset);
//! ```

mod manager;
mod protocol;
mod types;

pub use manager::{PermissionManager, PERMISSIONS_FILE};
pub use protocol::{resolve_feature_request, resolve_with_prompt, PermissionPrompt};
pub use types::{Decision, Feature, PermissionState};
