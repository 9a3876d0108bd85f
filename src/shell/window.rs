//! The web window
//!
//! Owns one browsing profile and its permission store, answers engine
//! requests, and implements hide/quit/reset-and-relaunch.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use url::Url;

use crate::core::{ShellError, ShellResult};
use crate::events::{
    DownloadAction, EngineEvent, EventHandler, EventKind, EventRegistry, ShellEvent, WebNotification,
};
use crate::permissions::{resolve_with_prompt, Feature, PermissionManager, PermissionPrompt, PermissionState};

use super::collaborators::{AppLifecycle, BrowserEngine, Collaborators, DesktopServices, SaveDialog, WindowSurface};
use super::config::{BrowsingProfile, ShellConfig, OPEN_AT_STARTUP_FLAG};

/// Reply to an event passed to `WebWindow::handle_event`
#[derive(Debug, Clone, PartialEq)]
pub enum EventResponse {
    Permission(PermissionState),
    Download(DownloadAction),
    /// Fullscreen requests are always accepted
    FullScreenAccepted,
    /// Nothing to report back; a close only hides the window
    Handled,
}

/// A single window hosting one site
pub struct WebWindow {
    config: ShellConfig,
    profile: BrowsingProfile,
    permissions: PermissionManager,
    prompt: Option<Box<dyn PermissionPrompt>>,
    events: EventRegistry,
    engine: Box<dyn BrowserEngine>,
    surface: Box<dyn WindowSurface>,
    dialog: Box<dyn SaveDialog>,
    desktop: Box<dyn DesktopServices>,
    lifecycle: Box<dyn AppLifecycle>,
}

impl WebWindow {
    /// Create the window, load the profile's permissions and the page
    ///
    /// The window stays hidden unless `open_at_startup` is set.
    pub fn new(config: ShellConfig, collaborators: Collaborators) -> Self {
        let profile = config.profile();
        let permissions = PermissionManager::load(profile.permission_path());

        let Collaborators {
            mut engine,
            mut surface,
            dialog,
            desktop,
            lifecycle,
        } = collaborators;

        tracing::info!("Opening {} in profile '{}'", config.url, profile.name());
        engine.load_url(&config.url);
        if config.open_at_startup {
            surface.set_visible(true);
        }

        Self {
            config,
            profile,
            permissions,
            prompt: None,
            events: EventRegistry::new(),
            engine,
            surface,
            dialog,
            desktop,
            lifecycle,
        }
    }

    /// Install the prompt used for features with no stored decision
    pub fn with_permission_prompt<P: PermissionPrompt + 'static>(mut self, prompt: P) -> Self {
        self.prompt = Some(Box::new(prompt));
        self
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn profile(&self) -> &BrowsingProfile {
        &self.profile
    }

    pub fn permissions(&self) -> &PermissionManager {
        &self.permissions
    }

    pub fn permissions_mut(&mut self) -> &mut PermissionManager {
        &mut self.permissions
    }

    /// Subscribe to events of a kind
    pub fn on_event<H: EventHandler + 'static>(&mut self, kind: EventKind, handler: H) -> &mut Self {
        self.events.on_event(kind, handler);
        self
    }

    /// Subscribe to events of a kind whose URL matches `pattern`
    pub fn on_event_matching<H: EventHandler + 'static>(
        &mut self,
        kind: EventKind,
        pattern: &str,
        handler: H,
    ) -> Result<&mut Self, regex::Error> {
        self.events.on_event_matching(kind, pattern, handler)?;
        Ok(self)
    }

    /// Route an engine or window event to its handler
    pub fn handle_event(&mut self, event: EngineEvent) -> EventResponse {
        match event {
            EngineEvent::PermissionRequested { origin, feature } => {
                EventResponse::Permission(self.permission_requested(&origin, feature))
            }
            EngineEvent::DownloadRequested { suggested_file_name } => {
                EventResponse::Download(self.download_requested(&suggested_file_name))
            }
            EngineEvent::FullScreenRequested { toggle_on } => {
                self.fullscreen_requested(toggle_on);
                EventResponse::FullScreenAccepted
            }
            EngineEvent::NewWindowRequested { url } => {
                self.new_window_requested(&url);
                EventResponse::Handled
            }
            EngineEvent::IconChanged { icon_url } => {
                self.icon_changed(icon_url);
                EventResponse::Handled
            }
            EngineEvent::TitleChanged { title } => {
                self.title_changed(title);
                EventResponse::Handled
            }
            EngineEvent::Notification(notification) => {
                self.notification(notification);
                EventResponse::Handled
            }
            EngineEvent::CloseRequested => {
                self.close_requested();
                EventResponse::Handled
            }
        }
    }

    /// Answer a page's capability request
    ///
    /// The engine receives exactly one state per request and it is not
    /// reset afterwards, so a stored grant or denial stays in effect for
    /// the origin.
    pub fn permission_requested(&mut self, origin: &Url, feature: Feature) -> PermissionState {
        self.events.dispatch(&ShellEvent::PermissionRequested {
            origin: origin.clone(),
            feature,
        });

        let prompt = self
            .prompt
            .as_mut()
            .map(|p| &mut **p as &mut dyn PermissionPrompt);
        let state = resolve_with_prompt(&mut self.permissions, prompt, origin, feature);
        tracing::info!("Permission {} for {}: {:?}", feature, origin, state);
        self.engine.set_feature_permission(origin, feature, state);

        self.events.dispatch(&ShellEvent::PermissionResolved {
            origin: origin.clone(),
            feature,
            state,
        });
        state
    }

    /// Ask where to save a download
    pub fn download_requested(&mut self, suggested_file_name: &str) -> DownloadAction {
        let suggested = self.suggested_download_path(suggested_file_name);
        let action = match self.dialog.save_path(&suggested) {
            Some(path) if !path.as_os_str().is_empty() => {
                tracing::info!("Accepting download to {:?}", path);
                DownloadAction::Accept { path }
            }
            _ => {
                tracing::debug!("Download of '{}' cancelled", suggested_file_name);
                DownloadAction::Reject
            }
        };

        self.events.dispatch(&ShellEvent::DownloadRequested {
            suggested_file_name: suggested_file_name.to_string(),
            action: action.clone(),
        });
        action
    }

    /// Enter or leave fullscreen. Always accepted.
    pub fn fullscreen_requested(&mut self, toggle_on: bool) {
        if toggle_on {
            self.surface.show_fullscreen();
        } else {
            self.surface.show_normal();
        }
        self.events.dispatch(&ShellEvent::FullScreenRequested { toggle_on });
    }

    /// Open a page's new-window request in the desktop browser
    pub fn new_window_requested(&mut self, url: &Url) {
        if let Err(e) = self.desktop.open_url(url) {
            tracing::warn!("Could not open {} externally: {}", url, e);
        }
        self.events
            .dispatch(&ShellEvent::NewWindowRequested { url: url.clone() });
    }

    pub fn icon_changed(&mut self, icon_url: Option<Url>) {
        self.events.dispatch(&ShellEvent::IconChanged { icon_url });
    }

    pub fn title_changed(&mut self, title: String) {
        self.events.dispatch(&ShellEvent::TitleChanged { title });
    }

    pub fn notification(&mut self, notification: WebNotification) {
        if !self.events.has_handlers(EventKind::Notification) {
            tracing::debug!("No notification handler; dropping '{}'", notification.title);
        }
        self.events.dispatch(&ShellEvent::Notification(notification));
    }

    /// Closing hides the window; the shell keeps running
    pub fn close_requested(&mut self) {
        self.surface.set_visible(false);
        self.events.dispatch(&ShellEvent::CloseRequested);
    }

    pub fn toggle_visibility(&mut self) {
        let visible = self.surface.is_visible();
        self.surface.set_visible(!visible);
    }

    /// Tear down the window and end the application
    ///
    /// Unwritten permission changes get one last write attempt.
    pub fn quit(mut self) {
        if self.permissions.is_dirty() {
            if let Err(e) = self.permissions.flush() {
                tracing::warn!("Permission changes lost on quit: {}", e);
            }
        }
        self.shutdown();
    }

    /// Wipe the profile and start a fresh instance of the application
    ///
    /// The new instance gets `--open-at-startup` (added once) so it shows
    /// its window. The current instance always quits and any error is
    /// returned. If the wipe fails nothing is relaunched and the profile is
    /// left in place for the next manual start; if the relaunch fails the
    /// profile is already gone.
    pub fn reset_profile(mut self) -> ShellResult<()> {
        let dir = self.profile.storage_dir().to_path_buf();
        let wiped = wipe_dir(&dir);

        let relaunched = wiped.and_then(|_| self.relaunch());

        // The store still holds the old decisions; never write them back
        self.shutdown();
        relaunched
    }

    fn relaunch(&mut self) -> ShellResult<()> {
        let mut args = self.lifecycle.current_arguments();
        if args.is_empty() {
            return Err(ShellError::Relaunch("no program path in arguments".to_string()));
        }
        if !args.iter().any(|a| a == OPEN_AT_STARTUP_FLAG) {
            args.push(OPEN_AT_STARTUP_FLAG.to_string());
        }

        let (program, rest) = args.split_at(1);
        tracing::info!("Relaunching {} {:?}", program[0], rest);
        self.lifecycle
            .spawn_detached(&program[0], rest)
            .map_err(|e| ShellError::Relaunch(format!("{}: {}", program[0], e)))
    }

    fn shutdown(mut self) {
        self.engine.detach();
        self.events.clear();
        tracing::info!("Closing profile '{}'", self.profile.name());
        let Self {
            permissions,
            mut lifecycle,
            ..
        } = self;
        drop(permissions);
        lifecycle.terminate();
    }

    fn suggested_download_path(&self, suggested_file_name: &str) -> PathBuf {
        // Only the final component; pages do not choose directories
        let name = Path::new(suggested_file_name)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "download".into());
        self.profile.download_dir().join(name)
    }
}

fn wipe_dir(dir: &Path) -> ShellResult<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {
            tracing::info!("Wiped profile storage {:?}", dir);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

impl std::fmt::Debug for WebWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebWindow")
            .field("url", &self.config.url.as_str())
            .field("profile", &self.profile.name())
            .field("permissions", &self.permissions.len())
            .field("events", &self.events)
            .finish()
    }
}
