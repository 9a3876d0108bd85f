//! Permission manager implementation
//!
//! Stores one decision per browser feature for a browsing profile, backed
//! by a line-oriented `feature=decision` file. Every mutation rewrites the
//! whole file (temp file + rename) before returning.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::core::{ShellError, ShellResult};

use super::types::{Decision, Feature};

/// File name of the permission store inside a profile's storage directory
pub const PERMISSIONS_FILE: &str = "permissions.state";

/// Per-profile permission decisions
///
/// Memory is updated before disk. If a write fails, `set` returns the IO
/// error but the new decision stays in effect for this session and
/// `is_dirty()` returns true until a later write succeeds.
#[derive(Debug)]
pub struct PermissionManager {
    decisions: HashMap<Feature, Decision>,
    path: PathBuf,
    /// Memory holds changes the file does not
    dirty: bool,
    /// Lines dropped as malformed during load
    skipped: usize,
    /// The file exists but could not be read; never overwrite it
    unreadable: bool,
}

impl PermissionManager {
    /// Load the store from `path`
    ///
    /// A missing file yields an empty store. Malformed lines (including
    /// invalid UTF-8) are skipped and counted, unknown feature names are
    /// ignored. A file that exists but cannot be read starts the store
    /// empty and read-only: decisions still apply in memory, but writes are
    /// refused so the unread file is never replaced. Loading never fails.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut unreadable = false;

        let contents = match fs::read(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No permission file at {:?}, starting empty", path);
                Vec::new()
            }
            // Unreachable path (e.g. a parent is a regular file): nothing to protect
            Err(e) if fs::symlink_metadata(&path).is_err() => {
                tracing::debug!("No permission file at {:?} ({}), starting empty", path, e);
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(
                    "Could not read permission file {:?}: {}; changes will not be saved",
                    path,
                    e
                );
                unreadable = true;
                Vec::new()
            }
        };

        let (decisions, errors) = parse(&contents);
        for err in &errors {
            tracing::warn!("Skipping entry in {:?}: {}", path, err);
        }

        tracing::info!(
            "Loaded {} permission decision(s) from {:?}",
            decisions.len(),
            path
        );

        Self {
            decisions,
            path,
            dirty: false,
            skipped: errors.len(),
            unreadable,
        }
    }

    /// Load the store for a profile storage directory
    pub fn for_profile_dir(dir: &Path) -> Self {
        Self::load(dir.join(PERMISSIONS_FILE))
    }

    /// Current decision for a feature. Never fails.
    pub fn get(&self, feature: Feature) -> Decision {
        self.decisions.get(&feature).copied().unwrap_or_default()
    }

    /// Record a decision and write the store to disk
    ///
    /// Overwrites any previous decision for the feature. `Decision::Unset`
    /// removes the entry. On write failure the in-memory change is kept.
    pub fn set(&mut self, feature: Feature, decision: Decision) -> ShellResult<()> {
        match decision {
            Decision::Unset => {
                self.decisions.remove(&feature);
            }
            _ => {
                self.decisions.insert(feature, decision);
            }
        }
        tracing::info!("Permission for {} set to {}", feature, decision);

        self.dirty = true;
        self.flush()
    }

    /// Grant a feature
    pub fn grant(&mut self, feature: Feature) -> ShellResult<()> {
        self.set(feature, Decision::Granted)
    }

    /// Deny a feature
    pub fn deny(&mut self, feature: Feature) -> ShellResult<()> {
        self.set(feature, Decision::Denied)
    }

    /// Forget the decision for a feature
    pub fn forget(&mut self, feature: Feature) -> ShellResult<()> {
        self.set(feature, Decision::Unset)
    }

    /// Forget every decision
    pub fn clear(&mut self) -> ShellResult<()> {
        self.decisions.clear();
        self.dirty = true;
        self.flush()
    }

    /// Write the store to disk if memory is ahead of it
    ///
    /// Used after a failed `set` to retry persistence.
    pub fn flush(&mut self) -> ShellResult<()> {
        if !self.dirty {
            return Ok(());
        }
        if self.unreadable {
            return Err(ShellError::UnreadableStore(self.path.clone()));
        }

        if let Err(e) = self.write_file() {
            tracing::warn!("Failed to persist permissions to {:?}: {}", self.path, e);
            return Err(e);
        }

        self.dirty = false;
        Ok(())
    }

    /// All recorded decisions, sorted by feature name
    pub fn decisions(&self) -> Vec<(Feature, Decision)> {
        Feature::ALL
            .iter()
            .filter_map(|f| self.decisions.get(f).map(|d| (*f, *d)))
            .collect()
    }

    /// Number of recorded decisions
    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    /// Check if no decision is recorded
    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    /// Whether memory holds decisions not yet written to disk
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the file existed but could not be read at load
    pub fn is_unreadable(&self) -> bool {
        self.unreadable
    }

    /// Number of malformed lines skipped during load
    pub fn skipped_entries(&self) -> usize {
        self.skipped
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_file(&self) -> ShellResult<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        // The profile directory may have been wiped since load
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(self.render().as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| ShellError::Io(e.error))?;

        Ok(())
    }

    fn render(&self) -> String {
        let mut out = format!("# permissions, written {}\n", chrono::Utc::now().to_rfc3339());
        for (feature, decision) in self.decisions() {
            out.push_str(feature.as_str());
            out.push('=');
            out.push_str(decision.as_str());
            out.push('\n');
        }
        out
    }
}

/// Parse file contents into decisions plus the errors for skipped lines
///
/// Unknown feature names are not errors. A later line for the same feature
/// wins.
fn parse(contents: &[u8]) -> (HashMap<Feature, Decision>, Vec<ShellError>) {
    let mut decisions = HashMap::new();
    let mut errors = Vec::new();

    for (idx, raw) in contents.split(|b| *b == b'\n').enumerate() {
        let line_no = idx + 1;
        let Ok(line) = std::str::from_utf8(raw) else {
            errors.push(ShellError::parse(line_no, "invalid UTF-8"));
            continue;
        };
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            errors.push(ShellError::parse(line_no, "expected feature=decision"));
            continue;
        };

        let feature = match key.trim().parse::<Feature>() {
            Ok(feature) => feature,
            Err(_) => {
                tracing::debug!("Ignoring unrecognised feature '{}' on line {}", key.trim(), line_no);
                continue;
            }
        };

        match value.trim().parse::<Decision>() {
            Ok(decision) => {
                decisions.insert(feature, decision);
            }
            Err(e) => errors.push(ShellError::parse(line_no, e.to_string())),
        }
    }

    (decisions, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (PermissionManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = PermissionManager::for_profile_dir(temp_dir.path());
        (store, temp_dir)
    }

    fn entry_lines(path: &Path) -> Vec<String> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .filter(|l| !l.starts_with('#'))
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_missing_file_is_empty() {
        let (store, temp) = create_test_store();

        assert!(store.is_empty());
        assert_eq!(store.skipped_entries(), 0);
        for feature in Feature::ALL {
            assert_eq!(store.get(feature), Decision::Unset);
        }
        // Loading alone does not create the file
        assert!(!temp.path().join(PERMISSIONS_FILE).exists());
    }

    #[test]
    fn test_set_then_get() {
        let (mut store, _temp) = create_test_store();

        store.set(Feature::Camera, Decision::Granted).unwrap();
        store.set(Feature::Geolocation, Decision::Denied).unwrap();

        assert_eq!(store.get(Feature::Camera), Decision::Granted);
        assert_eq!(store.get(Feature::Geolocation), Decision::Denied);
        assert_eq!(store.get(Feature::Microphone), Decision::Unset);
    }

    #[test]
    fn test_set_is_idempotent() {
        let (mut store, _temp) = create_test_store();

        store.grant(Feature::Clipboard).unwrap();
        store.grant(Feature::Clipboard).unwrap();

        assert_eq!(store.get(Feature::Clipboard), Decision::Granted);
        assert_eq!(store.len(), 1);
        assert_eq!(entry_lines(store.path()), vec!["clipboard=granted"]);
    }

    #[test]
    fn test_round_trip_across_reload() {
        let temp = TempDir::new().unwrap();

        {
            let mut store = PermissionManager::for_profile_dir(temp.path());
            store.grant(Feature::Microphone).unwrap();
            store.deny(Feature::MouseLock).unwrap();
        }

        let reloaded = PermissionManager::for_profile_dir(temp.path());
        assert_eq!(reloaded.get(Feature::Microphone), Decision::Granted);
        assert_eq!(reloaded.get(Feature::MouseLock), Decision::Denied);
        assert_eq!(reloaded.get(Feature::Camera), Decision::Unset);
    }

    #[test]
    fn test_persisted_microphone_scenario() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(PERMISSIONS_FILE);
        fs::write(&path, "microphone=granted\n").unwrap();

        let store = PermissionManager::load(&path);
        assert_eq!(store.get(Feature::Microphone), Decision::Granted);
        assert_eq!(store.get(Feature::Camera), Decision::Unset);
    }

    #[test]
    fn test_overwrite_leaves_single_line() {
        let (mut store, _temp) = create_test_store();

        store.set(Feature::Notifications, Decision::Denied).unwrap();
        store.set(Feature::Notifications, Decision::Granted).unwrap();

        assert_eq!(store.get(Feature::Notifications), Decision::Granted);
        assert_eq!(entry_lines(store.path()), vec!["notifications=granted"]);
    }

    #[test]
    fn test_unknown_feature_is_ignored() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(PERMISSIONS_FILE);
        fs::write(&path, "holographic-display=granted\ngeolocation=granted\n").unwrap();

        let store = PermissionManager::load(&path);
        assert_eq!(store.get(Feature::Geolocation), Decision::Granted);
        assert_eq!(store.len(), 1);
        // Forward-compatible keys are not counted as malformed
        assert_eq!(store.skipped_entries(), 0);
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(PERMISSIONS_FILE);
        fs::write(
            &path,
            "# comment\n\ncamera\nmicrophone=maybe\n  notifications = denied  \nclipboard=granted\n",
        )
        .unwrap();

        let store = PermissionManager::load(&path);
        assert_eq!(store.skipped_entries(), 2);
        assert_eq!(store.get(Feature::Camera), Decision::Unset);
        assert_eq!(store.get(Feature::Microphone), Decision::Unset);
        assert_eq!(store.get(Feature::Notifications), Decision::Denied);
        assert_eq!(store.get(Feature::Clipboard), Decision::Granted);
    }

    #[test]
    fn test_invalid_utf8_line_is_skipped() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(PERMISSIONS_FILE);
        fs::write(
            &path,
            b"camera=granted\nmicrophone=denied\nbad\xff=granted\ngeolocation=denied\n",
        )
        .unwrap();

        let mut store = PermissionManager::load(&path);
        assert_eq!(store.skipped_entries(), 1);
        assert!(!store.is_unreadable());
        assert_eq!(store.get(Feature::Camera), Decision::Granted);
        assert_eq!(store.get(Feature::Microphone), Decision::Denied);
        assert_eq!(store.get(Feature::Geolocation), Decision::Denied);

        // Writing keeps every decision that was readable
        store.grant(Feature::Clipboard).unwrap();
        assert_eq!(
            entry_lines(&path),
            vec![
                "camera=granted",
                "clipboard=granted",
                "geolocation=denied",
                "microphone=denied"
            ]
        );
    }

    #[test]
    fn test_unreadable_file_is_never_overwritten() {
        let temp = TempDir::new().unwrap();
        // A directory where the file should be: exists, but cannot be read
        let path = temp.path().join(PERMISSIONS_FILE);
        fs::create_dir(&path).unwrap();
        fs::write(path.join("marker"), "keep").unwrap();

        let mut store = PermissionManager::load(&path);
        assert!(store.is_unreadable());
        assert!(store.is_empty());

        let result = store.grant(Feature::Camera);
        assert!(matches!(result, Err(ShellError::UnreadableStore(_))));
        // Still applies for this session
        assert_eq!(store.get(Feature::Camera), Decision::Granted);
        assert!(store.is_dirty());
        assert!(path.join("marker").exists());
    }

    #[test]
    fn test_later_duplicate_wins_and_is_compacted() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(PERMISSIONS_FILE);
        fs::write(&path, "camera=denied\ncamera=granted\n").unwrap();

        let mut store = PermissionManager::load(&path);
        assert_eq!(store.get(Feature::Camera), Decision::Granted);

        store.deny(Feature::Geolocation).unwrap();
        assert_eq!(
            entry_lines(&path),
            vec!["camera=granted", "geolocation=denied"]
        );
    }

    #[test]
    fn test_forget_and_clear() {
        let (mut store, _temp) = create_test_store();

        store.grant(Feature::Camera).unwrap();
        store.grant(Feature::Microphone).unwrap();
        store.forget(Feature::Camera).unwrap();

        assert_eq!(store.get(Feature::Camera), Decision::Unset);
        assert_eq!(entry_lines(store.path()), vec!["microphone=granted"]);

        store.clear().unwrap();
        assert!(store.is_empty());
        assert!(entry_lines(store.path()).is_empty());
    }

    #[test]
    fn test_file_is_sorted_by_feature_name() {
        let (mut store, _temp) = create_test_store();

        store.grant(Feature::ScreenCapture).unwrap();
        store.deny(Feature::Camera).unwrap();
        store.grant(Feature::LocalFonts).unwrap();

        assert_eq!(
            entry_lines(store.path()),
            vec!["camera=denied", "local-fonts=granted", "screen-capture=granted"]
        );
    }

    #[test]
    fn test_write_failure_keeps_memory() {
        let temp = TempDir::new().unwrap();
        // A regular file where the profile directory should be
        let blocker = temp.path().join("profile");
        fs::write(&blocker, "").unwrap();

        let mut store = PermissionManager::for_profile_dir(&blocker);
        let result = store.grant(Feature::Camera);

        assert!(matches!(result, Err(ShellError::Io(_))));
        assert_eq!(store.get(Feature::Camera), Decision::Granted);
        assert!(store.is_dirty());

        // Still failing on retry
        assert!(store.flush().is_err());
        assert!(store.is_dirty());
    }

    #[test]
    fn test_flush_recovers_after_failure() {
        let temp = TempDir::new().unwrap();
        let profile = temp.path().join("profile");
        fs::write(&profile, "").unwrap();

        let mut store = PermissionManager::for_profile_dir(&profile);
        assert!(store.deny(Feature::Geolocation).is_err());

        // Obstacle removed, retry succeeds
        fs::remove_file(&profile).unwrap();
        store.flush().unwrap();
        assert!(!store.is_dirty());

        let reloaded = PermissionManager::for_profile_dir(&profile);
        assert_eq!(reloaded.get(Feature::Geolocation), Decision::Denied);
    }

    #[test]
    fn test_survives_profile_wipe() {
        let temp = TempDir::new().unwrap();
        let profile = temp.path().join("profile");

        let mut store = PermissionManager::for_profile_dir(&profile);
        store.grant(Feature::Camera).unwrap();

        fs::remove_dir_all(&profile).unwrap();

        // Next write recreates the directory
        store.grant(Feature::Microphone).unwrap();
        let reloaded = PermissionManager::for_profile_dir(&profile);
        assert_eq!(reloaded.get(Feature::Camera), Decision::Granted);
        assert_eq!(reloaded.get(Feature::Microphone), Decision::Granted);
    }

    #[test]
    fn test_decisions_snapshot() {
        let (mut store, _temp) = create_test_store();
        store.deny(Feature::Notifications).unwrap();
        store.grant(Feature::Camera).unwrap();

        assert_eq!(
            store.decisions(),
            vec![
                (Feature::Camera, Decision::Granted),
                (Feature::Notifications, Decision::Denied),
            ]
        );
    }
}
