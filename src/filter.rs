//! Filter predicates deciding which folders and files participate in sync.
//!
//! Two layers are consulted per entry: user rules loaded from an optional
//! `sync_filters.json` in the tree root, then the built-in default policy.
//! The first user rule that matches gives a definite answer and wins;
//! otherwise the defaults apply. The reserved manifest name is excluded
//! unconditionally and cannot be overridden.
//!
//! Filters are plain values threaded through the engine entry points, never
//! ambient state, so algorithms can be tested with synthetic rule sets.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, SyncError};
use crate::logging::Logger;

/// Reserved name of the persisted manifest at the root of a live tree.
///
/// The manifest is invisible to hashing, verification, and delta; it is also
/// the name under which a delta archive carries its new baseline.
pub const MANIFEST_FILE_NAME: &str = ".hashes.json";

/// Name of the optional user rules file, looked up in the tree root.
pub const FILTER_RULES_FILE: &str = "sync_filters.json";

/// Folder names the default policy never descends into.
const DEFAULT_IGNORED_FOLDERS: &[&str] = &[".git", ".vscode", "__pycache__"];

/// File name suffixes the default policy always ignores.
const DEFAULT_IGNORED_SUFFIXES: &[&str] = &[".log", ".bak"];

/// Per-file filter verdict.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileDisposition {
    /// Invisible to hashing; tolerated if physically present during verify.
    AlwaysIgnore,
    /// Synced and recorded, but later content drift is logged, not fatal.
    IgnoreIfMissing,
    /// Fully tracked.
    Include,
}

/// Declarative user rules, deserialized from `sync_filters.json`.
///
/// ```json
/// {
///   "folders": [ { "name": "build", "include": false } ],
///   "files": [
///     { "suffix": ".tmp", "action": "ignore" },
///     { "name": "local.ini", "path": "config", "action": "ignore-if-missing" }
///   ]
/// }
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct FilterRules {
    #[serde(default)]
    pub folders: Vec<FolderRule>,
    #[serde(default)]
    pub files: Vec<FileRule>,
}

/// A folder rule: matches by name, optionally scoped to one parent path.
#[derive(Debug, Deserialize)]
pub struct FolderRule {
    pub name: String,
    /// Slash-joined parent path relative to the root; `None` matches at any
    /// depth.
    #[serde(default)]
    pub path: Option<String>,
    pub include: bool,
}

impl FolderRule {
    fn matches(&self, parents: &[String], name: &str) -> bool {
        self.name == name && path_matches(self.path.as_deref(), parents)
    }
}

/// A file rule: matches by exact name or suffix, optionally path-scoped.
#[derive(Debug, Deserialize)]
pub struct FileRule {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub suffix: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    pub action: FileAction,
}

impl FileRule {
    fn matches(&self, parents: &[String], name: &str) -> bool {
        let by_name = match (&self.name, &self.suffix) {
            (Some(exact), _) => exact == name,
            (None, Some(suffix)) => name.ends_with(suffix.as_str()),
            (None, None) => false,
        };
        by_name && path_matches(self.path.as_deref(), parents)
    }
}

fn path_matches(scope: Option<&str>, parents: &[String]) -> bool {
    match scope {
        None => true,
        Some(scope) => parents.join("/") == scope,
    }
}

/// Verdict of a [`FileRule`], as written in the rules file.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FileAction {
    Ignore,
    IgnoreIfMissing,
    Include,
}

impl From<FileAction> for FileDisposition {
    fn from(action: FileAction) -> Self {
        match action {
            FileAction::Ignore => FileDisposition::AlwaysIgnore,
            FileAction::IgnoreIfMissing => FileDisposition::IgnoreIfMissing,
            FileAction::Include => FileDisposition::Include,
        }
    }
}

/// The filter predicates consulted by every sync algorithm.
#[derive(Debug, Default)]
pub struct FilterSet {
    rules: FilterRules,
}

impl FilterSet {
    /// The default policy with no user overrides.
    pub fn default_policy() -> Self {
        Self::default()
    }

    /// Wrap explicit rules; used by tests and library callers.
    pub fn with_rules(rules: FilterRules) -> Self {
        Self { rules }
    }

    /// Load user rules from `sync_filters.json` under `root`.
    ///
    /// An absent rules file is not an error — the default policy applies. A
    /// present but unreadable or unparseable file is fatal.
    pub fn load(root: &Path, log: &Logger) -> Result<Self> {
        let rules_path = root.join(FILTER_RULES_FILE);
        if !rules_path.is_file() {
            return Ok(Self::default_policy());
        }

        let contents = std::fs::read_to_string(&rules_path).map_err(|e| SyncError::FilterRules {
            path: rules_path.clone(),
            message: e.to_string(),
        })?;

        let rules: FilterRules =
            serde_json::from_str(&contents).map_err(|e| SyncError::FilterRules {
                path: rules_path.clone(),
                message: e.to_string(),
            })?;

        log.info(format!("Filter rules loaded from: {}", rules_path.display()));
        Ok(Self::with_rules(rules))
    }

    /// Exclude one specific file, given its path relative to the tree root.
    ///
    /// Inserted ahead of user rules, so it cannot be overridden. Used for the
    /// delta archive when it is written inside the tree being packaged, so a
    /// half-written container is never packaged into itself.
    pub fn ignore_file_at(&mut self, rel: &Path) {
        let Some(name) = rel.file_name() else {
            return;
        };
        let parent = rel
            .parent()
            .map(|p| {
                p.iter()
                    .map(|part| part.to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .unwrap_or_default();
        self.rules.files.insert(
            0,
            FileRule {
                name: Some(name.to_string_lossy().into_owned()),
                suffix: None,
                path: Some(parent),
                action: FileAction::Ignore,
            },
        );
    }

    /// Whether to descend into a folder named `name` under `parents`.
    pub fn folder_included(&self, parents: &[String], name: &str) -> bool {
        for rule in &self.rules.folders {
            if rule.matches(parents, name) {
                return rule.include;
            }
        }
        !DEFAULT_IGNORED_FOLDERS.contains(&name)
    }

    /// Verdict for a file named `name` under `parents`.
    pub fn file_disposition(&self, parents: &[String], name: &str) -> FileDisposition {
        // The manifest excludes itself unconditionally; a user rule cannot
        // pull it back into the synced set.
        if name == MANIFEST_FILE_NAME {
            return FileDisposition::AlwaysIgnore;
        }
        for rule in &self.rules.files {
            if rule.matches(parents, name) {
                return rule.action.into();
            }
        }
        if DEFAULT_IGNORED_SUFFIXES
            .iter()
            .any(|suffix| name.ends_with(suffix))
        {
            FileDisposition::AlwaysIgnore
        } else {
            FileDisposition::Include
        }
    }
}

/// Joins a cursor and an entry name into a relative path for reporting.
pub(crate) fn relative_path(parents: &[String], name: &str) -> PathBuf {
    let mut path: PathBuf = parents.iter().collect();
    path.push(name);
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parents(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn default_policy_excludes_reserved_folders() {
        let filters = FilterSet::default_policy();
        assert!(!filters.folder_included(&[], ".git"));
        assert!(!filters.folder_included(&[], ".vscode"));
        assert!(!filters.folder_included(&[], "__pycache__"));
        assert!(filters.folder_included(&[], "src"));
    }

    #[test]
    fn default_policy_ignores_log_and_backup_files() {
        let filters = FilterSet::default_policy();
        assert_eq!(
            filters.file_disposition(&[], "server.log"),
            FileDisposition::AlwaysIgnore
        );
        assert_eq!(
            filters.file_disposition(&[], "settings.bak"),
            FileDisposition::AlwaysIgnore
        );
        assert_eq!(
            filters.file_disposition(&[], "main.rs"),
            FileDisposition::Include
        );
    }

    #[test]
    fn manifest_name_is_always_ignored_even_with_include_rule() {
        let rules: FilterRules = serde_json::from_str(
            r#"{ "files": [ { "name": ".hashes.json", "action": "include" } ] }"#,
        )
        .unwrap();
        let filters = FilterSet::with_rules(rules);
        assert_eq!(
            filters.file_disposition(&[], MANIFEST_FILE_NAME),
            FileDisposition::AlwaysIgnore
        );
    }

    #[test]
    fn user_rule_takes_precedence_over_default() {
        let rules: FilterRules = serde_json::from_str(
            r#"{
                "folders": [ { "name": ".git", "include": true } ],
                "files": [ { "suffix": ".log", "action": "ignore-if-missing" } ]
            }"#,
        )
        .unwrap();
        let filters = FilterSet::with_rules(rules);
        assert!(filters.folder_included(&[], ".git"));
        assert_eq!(
            filters.file_disposition(&[], "trace.log"),
            FileDisposition::IgnoreIfMissing
        );
    }

    #[test]
    fn path_scoped_rule_only_fires_at_its_path() {
        let rules: FilterRules = serde_json::from_str(
            r#"{ "files": [ { "name": "local.ini", "path": "config", "action": "ignore" } ] }"#,
        )
        .unwrap();
        let filters = FilterSet::with_rules(rules);
        assert_eq!(
            filters.file_disposition(&parents(&["config"]), "local.ini"),
            FileDisposition::AlwaysIgnore
        );
        assert_eq!(
            filters.file_disposition(&parents(&["other"]), "local.ini"),
            FileDisposition::Include
        );
        assert_eq!(
            filters.file_disposition(&[], "local.ini"),
            FileDisposition::Include
        );
    }

    #[test]
    fn first_matching_rule_wins() {
        let rules: FilterRules = serde_json::from_str(
            r#"{
                "files": [
                    { "name": "app.log", "action": "include" },
                    { "suffix": ".log", "action": "ignore" }
                ]
            }"#,
        )
        .unwrap();
        let filters = FilterSet::with_rules(rules);
        assert_eq!(
            filters.file_disposition(&[], "app.log"),
            FileDisposition::Include
        );
        assert_eq!(
            filters.file_disposition(&[], "other.log"),
            FileDisposition::AlwaysIgnore
        );
    }

    #[test]
    fn ignore_file_at_excludes_only_that_path() {
        let mut filters = FilterSet::default_policy();
        filters.ignore_file_at(Path::new("out/update.zip"));

        assert_eq!(
            filters.file_disposition(&parents(&["out"]), "update.zip"),
            FileDisposition::AlwaysIgnore
        );
        assert_eq!(
            filters.file_disposition(&[], "update.zip"),
            FileDisposition::Include
        );
        assert_eq!(
            filters.file_disposition(&parents(&["out"]), "other.zip"),
            FileDisposition::Include
        );
    }

    #[test]
    fn ignore_file_at_beats_user_rules() {
        let rules: FilterRules = serde_json::from_str(
            r#"{ "files": [ { "name": "update.zip", "action": "include" } ] }"#,
        )
        .unwrap();
        let mut filters = FilterSet::with_rules(rules);
        filters.ignore_file_at(Path::new("update.zip"));

        assert_eq!(
            filters.file_disposition(&[], "update.zip"),
            FileDisposition::AlwaysIgnore
        );
    }

    #[test]
    fn load_missing_rules_file_falls_back_to_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let filters = FilterSet::load(temp_dir.path(), &Logger::silent()).unwrap();
        assert!(!filters.folder_included(&[], ".git"));
    }

    #[test]
    fn load_invalid_rules_file_is_fatal() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(FILTER_RULES_FILE), "not json").unwrap();
        let result = FilterSet::load(temp_dir.path(), &Logger::silent());
        assert!(matches!(result, Err(SyncError::FilterRules { .. })));
    }
}
