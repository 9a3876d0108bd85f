//! Shell Configuration
//!
//! Configuration and browsing-profile layout for a `WebWindow`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::ShellResult;
use crate::permissions::PERMISSIONS_FILE;

/// Flag appended when the shell relaunches itself after a profile reset
pub const OPEN_AT_STARTUP_FLAG: &str = "--open-at-startup";

/// Directory name under the platform data dir
const APP_DIR: &str = "webshell";

/// Profile name used when the URL has no host
const DEFAULT_PROFILE: &str = "default";

/// Configuration for a WebWindow
///
/// ```ignore
/// let config = ShellConfig::new("https://mail.example.com")?
///     .with_profile_root("/tmp/profiles")
///     .with_open_at_startup(true);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Page the window hosts
    pub url: Url,

    /// Directory holding one storage directory per profile
    #[serde(default = "default_profile_root")]
    pub profile_root: PathBuf,

    /// Where save dialogs start (None = platform download dir)
    #[serde(default)]
    pub download_dir: Option<PathBuf>,

    /// Show the window as soon as it is created
    #[serde(default)]
    pub open_at_startup: bool,
}

fn default_profile_root() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
}

impl ShellConfig {
    /// Create a configuration for a URL with platform defaults
    pub fn new(url: &str) -> ShellResult<Self> {
        Ok(Self {
            url: Url::parse(url)?,
            profile_root: default_profile_root(),
            download_dir: None,
            open_at_startup: false,
        })
    }

    /// Create a configuration, reading startup flags from process arguments
    pub fn from_args<I, S>(url: &str, args: I) -> ShellResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let open = args.into_iter().any(|a| a.as_ref() == OPEN_AT_STARTUP_FLAG);
        Ok(Self::new(url)?.with_open_at_startup(open))
    }

    /// Set the directory profiles are stored under
    pub fn with_profile_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.profile_root = root.into();
        self
    }

    /// Set the directory save dialogs start in
    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = Some(dir.into());
        self
    }

    /// Show the window on creation
    pub fn with_open_at_startup(mut self, open: bool) -> Self {
        self.open_at_startup = open;
        self
    }

    /// Resolve the browsing profile for this configuration
    pub fn profile(&self) -> BrowsingProfile {
        let name = self
            .url
            .host_str()
            .filter(|h| !h.is_empty())
            .unwrap_or(DEFAULT_PROFILE)
            .to_string();
        let storage_dir = self.profile_root.join(&name);
        let download_dir = self
            .download_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| storage_dir.join("downloads"));

        BrowsingProfile {
            permission_path: storage_dir.join(PERMISSIONS_FILE),
            name,
            storage_dir,
            download_dir,
        }
    }
}

/// Persistent storage layout of one browsing profile
///
/// One profile per site host; never shared between windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowsingProfile {
    name: String,
    storage_dir: PathBuf,
    download_dir: PathBuf,
    permission_path: PathBuf,
}

impl BrowsingProfile {
    /// Profile name (the site host)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Persistent storage directory, wiped on reset
    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Location of the permission store
    pub fn permission_path(&self) -> &Path {
        &self.permission_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_named_after_host() {
        let config = ShellConfig::new("https://mail.example.com/inbox")
            .unwrap()
            .with_profile_root("/data/profiles")
            .with_download_dir("/home/user/Downloads");

        let profile = config.profile();
        assert_eq!(profile.name(), "mail.example.com");
        assert_eq!(profile.storage_dir(), Path::new("/data/profiles/mail.example.com"));
        assert_eq!(
            profile.permission_path(),
            Path::new("/data/profiles/mail.example.com/permissions.state")
        );
        assert_eq!(profile.download_dir(), Path::new("/home/user/Downloads"));
    }

    #[test]
    fn test_hostless_url_uses_default_profile() {
        let config = ShellConfig::new("file:///srv/app/index.html")
            .unwrap()
            .with_profile_root("/p");
        assert_eq!(config.profile().name(), "default");
    }

    #[test]
    fn test_permission_file_is_fixed() {
        let config = ShellConfig::new("https://a.example").unwrap().with_profile_root("/p");
        assert_eq!(
            config.profile().permission_path(),
            Path::new("/p/a.example/permissions.state")
        );
    }

    #[test]
    fn test_invalid_url() {
        assert!(ShellConfig::new("not a url").is_err());
    }

    #[test]
    fn test_from_args() {
        let config =
            ShellConfig::from_args("https://a.example", ["webshell", OPEN_AT_STARTUP_FLAG]).unwrap();
        assert!(config.open_at_startup);

        let config = ShellConfig::from_args("https://a.example", ["webshell"]).unwrap();
        assert!(!config.open_at_startup);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: ShellConfig =
            serde_json::from_str(r#"{"url": "https://chat.example.org", "open_at_startup": true}"#)
                .unwrap();
        assert_eq!(config.url.host_str(), Some("chat.example.org"));
        assert!(config.open_at_startup);
        assert!(config.profile().permission_path().ends_with(PERMISSIONS_FILE));
        assert!(config.download_dir.is_none());
    }
}
