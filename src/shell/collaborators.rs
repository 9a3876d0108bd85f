//! External collaborators of the window
//!
//! The browser engine, the native window, the save dialog, the desktop URL
//! handler and the process layer are all outside this crate. The window
//! talks to them only through these traits, so it can be driven in tests
//! without a live engine.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use url::Url;

use crate::permissions::{Feature, PermissionState};

/// The embedded browser engine
pub trait BrowserEngine {
    /// Navigate the page
    fn load_url(&mut self, url: &Url);

    /// Report the permission result for an origin+feature
    fn set_feature_permission(&mut self, origin: &Url, feature: Feature, state: PermissionState);

    /// Stop delivering events to the shell
    fn detach(&mut self);
}

/// The native top-level window
pub trait WindowSurface {
    fn show_fullscreen(&mut self);
    fn show_normal(&mut self);
    fn set_visible(&mut self, visible: bool);
    fn is_visible(&self) -> bool;
}

/// Native save-file picker
pub trait SaveDialog {
    /// Ask for a destination seeded with `suggested`. `None` = cancelled.
    fn save_path(&mut self, suggested: &Path) -> Option<PathBuf>;
}

/// Opens URLs in the user's default handler
pub trait DesktopServices {
    fn open_url(&mut self, url: &Url) -> io::Result<()>;
}

/// The running application instance
pub trait AppLifecycle {
    /// Arguments the process was started with, program path first
    fn current_arguments(&self) -> Vec<String>;

    /// Start a new process without waiting for it
    fn spawn_detached(&mut self, program: &str, args: &[String]) -> io::Result<()>;

    /// End the current instance
    fn terminate(&mut self);
}

/// Everything a `WebWindow` needs from the outside world
pub struct Collaborators {
    pub engine: Box<dyn BrowserEngine>,
    pub surface: Box<dyn WindowSurface>,
    pub dialog: Box<dyn SaveDialog>,
    pub desktop: Box<dyn DesktopServices>,
    pub lifecycle: Box<dyn AppLifecycle>,
}

/// `AppLifecycle` backed by the real process
///
/// `terminate` runs the quit callback, which should stop the GUI event
/// loop. Without one it exits the process.
pub struct ProcessLifecycle {
    quit: Option<Box<dyn FnMut()>>,
}

impl ProcessLifecycle {
    pub fn new() -> Self {
        Self { quit: None }
    }

    /// Use `quit` instead of exiting the process
    pub fn with_quit<F: FnMut() + 'static>(quit: F) -> Self {
        Self {
            quit: Some(Box::new(quit)),
        }
    }
}

impl Default for ProcessLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl AppLifecycle for ProcessLifecycle {
    fn current_arguments(&self) -> Vec<String> {
        std::env::args().collect()
    }

    fn spawn_detached(&mut self, program: &str, args: &[String]) -> io::Result<()> {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        tracing::info!("Spawned {} (pid {})", program, child.id());
        // Dropping the handle leaves the child running
        Ok(())
    }

    fn terminate(&mut self) {
        match self.quit.as_mut() {
            Some(quit) => quit(),
            None => std::process::exit(0),
        }
    }
}

impl std::fmt::Debug for ProcessLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessLifecycle")
            .field("has_quit_callback", &self.quit.is_some())
            .finish()
    }
}
