//! Event Types
//!
//! - `EngineEvent` - input from the engine or the native window
//! - `ShellEvent` - what subscribers see, after the shell acted on it
//! - `EventKind` - the key handlers are registered under
//! - `WebNotification` - a page notification to present
//! - `DownloadAction` - how a download request was answered

use std::path::PathBuf;

use url::Url;

use crate::permissions::{Feature, PermissionState};

/// Event kinds handlers can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PermissionRequested,
    PermissionResolved,
    DownloadRequested,
    FullScreenRequested,
    NewWindowRequested,
    IconChanged,
    TitleChanged,
    Notification,
    CloseRequested,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EventKind::PermissionRequested => "PermissionRequested",
            EventKind::PermissionResolved => "PermissionResolved",
            EventKind::DownloadRequested => "DownloadRequested",
            EventKind::FullScreenRequested => "FullScreenRequested",
            EventKind::NewWindowRequested => "NewWindowRequested",
            EventKind::IconChanged => "IconChanged",
            EventKind::TitleChanged => "TitleChanged",
            EventKind::Notification => "Notification",
            EventKind::CloseRequested => "CloseRequested",
        };
        f.write_str(name)
    }
}

/// A notification a page asked the shell to show
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebNotification {
    pub origin: Url,
    pub title: String,
    pub message: String,
}

/// Answer to a download request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadAction {
    /// Save to this path
    Accept { path: PathBuf },
    /// The user cancelled the dialog
    Reject,
}

/// Requests and notifications the engine or native window sends the shell
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    PermissionRequested { origin: Url, feature: Feature },
    DownloadRequested { suggested_file_name: String },
    FullScreenRequested { toggle_on: bool },
    NewWindowRequested { url: Url },
    IconChanged { icon_url: Option<Url> },
    TitleChanged { title: String },
    Notification(WebNotification),
    CloseRequested,
}

/// Events delivered to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum ShellEvent {
    /// A page asked for a capability
    PermissionRequested { origin: Url, feature: Feature },

    /// The shell answered a capability request
    PermissionResolved {
        origin: Url,
        feature: Feature,
        state: PermissionState,
    },

    /// A download was answered
    DownloadRequested {
        suggested_file_name: String,
        action: DownloadAction,
    },

    /// The page entered or left fullscreen
    FullScreenRequested { toggle_on: bool },

    /// The page tried to open a new window
    NewWindowRequested { url: Url },

    /// The page favicon changed
    IconChanged { icon_url: Option<Url> },

    /// The page title changed
    TitleChanged { title: String },

    /// The page posted a notification
    Notification(WebNotification),

    /// The user closed the window and it was hidden
    CloseRequested,
}

impl ShellEvent {
    /// The kind this event is dispatched under
    pub fn kind(&self) -> EventKind {
        match self {
            ShellEvent::PermissionRequested { .. } => EventKind::PermissionRequested,
            ShellEvent::PermissionResolved { .. } => EventKind::PermissionResolved,
            ShellEvent::DownloadRequested { .. } => EventKind::DownloadRequested,
            ShellEvent::FullScreenRequested { .. } => EventKind::FullScreenRequested,
            ShellEvent::NewWindowRequested { .. } => EventKind::NewWindowRequested,
            ShellEvent::IconChanged { .. } => EventKind::IconChanged,
            ShellEvent::TitleChanged { .. } => EventKind::TitleChanged,
            ShellEvent::Notification(_) => EventKind::Notification,
            ShellEvent::CloseRequested => EventKind::CloseRequested,
        }
    }

    /// URL an origin pattern is matched against, if the event has one
    pub fn url(&self) -> Option<&Url> {
        match self {
            ShellEvent::PermissionRequested { origin, .. }
            | ShellEvent::PermissionResolved { origin, .. } => Some(origin),
            ShellEvent::NewWindowRequested { url } => Some(url),
            ShellEvent::IconChanged { icon_url } => icon_url.as_ref(),
            ShellEvent::Notification(n) => Some(&n.origin),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_url() {
        let origin = Url::parse("https://chat.example.org/room").unwrap();
        let event = ShellEvent::PermissionRequested {
            origin: origin.clone(),
            feature: Feature::Notifications,
        };
        assert_eq!(event.kind(), EventKind::PermissionRequested);
        assert_eq!(event.url(), Some(&origin));

        let event = ShellEvent::TitleChanged { title: "Inbox (3)".into() };
        assert_eq!(event.kind(), EventKind::TitleChanged);
        assert_eq!(event.url(), None);
        assert_eq!(event.kind().to_string(), "TitleChanged");
    }
}
