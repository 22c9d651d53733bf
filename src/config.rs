//! Configuration from `wt.*` git config keys, overridden per invocation by flags.
//!
//! ```text
//! [wt]
//!     basedir = ../{gitroot}-worktrees
//!     copyignored = true
//!     nocopy = node_modules/
//!     hook = npm install
//!     nocd = create
//! ```
//!
//! Precedence for every key: explicit flag > stored value > default. Keys
//! under `wt.` that aren't recognized are ignored, so newer configs keep
//! working with older binaries.

use std::str::FromStr;

use crate::git::{GitError, Repository};

/// Default worktree base directory, relative to the main root.
pub const DEFAULT_BASEDIR: &str = ".wt";

/// When to suppress changing directory after a successful invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display)]
pub enum NoCd {
    /// Always change directory
    #[default]
    #[strum(serialize = "false")]
    Never,
    /// Never change directory
    #[strum(serialize = "true")]
    Always,
    /// Change directory when switching, not when a worktree was just created
    #[strum(serialize = "create")]
    Create,
}

impl NoCd {
    /// Whether a cd target should be suppressed for an invocation that did
    /// (or did not) create a worktree.
    pub fn suppresses(self, created: bool) -> bool {
        match self {
            NoCd::Never => false,
            NoCd::Always => true,
            NoCd::Create => created,
        }
    }
}

impl FromStr for NoCd {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("create") {
            return Ok(NoCd::Create);
        }
        match parse_bool(s) {
            Some(true) => Ok(NoCd::Always),
            Some(false) => Ok(NoCd::Never),
            None => Err(format!("expected true, false, or create, got '{s}'")),
        }
    }
}

/// Parse a boolean the way git does.
///
/// The empty string is true: `git config wt.copyignored` with no `=` stores
/// a bare key.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Per-invocation overrides, one per flag.
///
/// `None` (or an empty list) means the flag was not given.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub basedir: Option<String>,
    pub copy_ignored: Option<bool>,
    pub copy_untracked: Option<bool>,
    pub copy_modified: Option<bool>,
    pub copy: Vec<String>,
    pub nocopy: Vec<String>,
    pub hooks: Vec<String>,
    pub delete_hooks: Vec<String>,
    pub nocd: Option<NoCd>,
    pub relative: Option<bool>,
}

/// Resolved configuration for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub basedir: String,
    /// Whether `basedir` came from git config or a flag rather than the default
    pub basedir_explicit: bool,
    pub copy_ignored: bool,
    pub copy_untracked: bool,
    pub copy_modified: bool,
    pub copy: Vec<String>,
    pub nocopy: Vec<String>,
    pub hooks: Vec<String>,
    pub delete_hooks: Vec<String>,
    pub nocd: NoCd,
    pub relative: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            basedir: DEFAULT_BASEDIR.to_string(),
            basedir_explicit: false,
            copy_ignored: false,
            copy_untracked: false,
            copy_modified: false,
            copy: Vec::new(),
            nocopy: Vec::new(),
            hooks: Vec::new(),
            delete_hooks: Vec::new(),
            nocd: NoCd::Never,
            relative: false,
        }
    }
}

impl Config {
    /// Read `wt.*` from the repository's git config and apply `overrides`.
    pub fn load(repo: &Repository, overrides: &ConfigOverrides) -> anyhow::Result<Self> {
        let entries = repo.config_entries(r"^wt\.")?;
        let mut config = Self::from_entries(entries)?;
        config.apply(overrides);
        log::debug!("Resolved config: {config:?}");
        Ok(config)
    }

    /// Build from `(key, value)` pairs in git config order.
    ///
    /// Single-valued keys take the last value, as `git config --get` does.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self, GitError> {
        let mut config = Self::default();

        for (key, value) in entries {
            let key = key.to_ascii_lowercase();
            let Some(name) = key.strip_prefix("wt.") else {
                continue;
            };
            match name {
                "basedir" => {
                    config.basedir = value;
                    config.basedir_explicit = true;
                }
                "copyignored" => config.copy_ignored = stored_bool(&key, &value)?,
                "copyuntracked" => config.copy_untracked = stored_bool(&key, &value)?,
                "copymodified" => config.copy_modified = stored_bool(&key, &value)?,
                "relative" => config.relative = stored_bool(&key, &value)?,
                "copy" => config.copy.push(value),
                "nocopy" => config.nocopy.push(value),
                "hook" => config.hooks.push(value),
                "deletehook" => config.delete_hooks.push(value),
                "nocd" => {
                    config.nocd = value.parse().map_err(|_| GitError::ConfigInvalid {
                        key: key.clone(),
                        value: value.clone(),
                        expected: "true, false, or create",
                    })?;
                }
                _ => log::debug!("Ignoring unknown config key {key}"),
            }
        }

        Ok(config)
    }

    /// Apply flag overrides. A list flag replaces the stored list.
    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        if let Some(basedir) = &overrides.basedir {
            self.basedir = basedir.clone();
            self.basedir_explicit = true;
        }
        override_value(&mut self.copy_ignored, overrides.copy_ignored);
        override_value(&mut self.copy_untracked, overrides.copy_untracked);
        override_value(&mut self.copy_modified, overrides.copy_modified);
        override_value(&mut self.nocd, overrides.nocd);
        override_value(&mut self.relative, overrides.relative);
        override_list(&mut self.copy, &overrides.copy);
        override_list(&mut self.nocopy, &overrides.nocopy);
        override_list(&mut self.hooks, &overrides.hooks);
        override_list(&mut self.delete_hooks, &overrides.delete_hooks);
    }

    /// Whether any file category or pattern asks for copying.
    pub fn copies_anything(&self) -> bool {
        self.copy_ignored || self.copy_untracked || self.copy_modified || !self.copy.is_empty()
    }
}

fn stored_bool(key: &str, value: &str) -> Result<bool, GitError> {
    parse_bool(value).ok_or_else(|| GitError::ConfigInvalid {
        key: key.to_string(),
        value: value.to_string(),
        expected: "a boolean",
    })
}

fn override_value<T: Copy>(slot: &mut T, flag: Option<T>) {
    if let Some(value) = flag {
        *slot = value;
    }
}

fn override_list(slot: &mut Vec<String>, flag: &[String]) {
    if !flag.is_empty() {
        *slot = flag.to_vec();
    }
}
