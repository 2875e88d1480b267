use std::collections::HashMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::cli::{CheckArgs, RuleArgs};
use crate::error::{Result, VerifyError};

/// Thresholds and switches for the rule catalog.
///
/// Ages and spans are whole years. Persisted as toml in the config dir.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyOptions {
    /// Maximum age at death
    pub oldage: u32,
    /// Maximum husband-wife age difference
    pub hwdif: u32,
    /// Maximum gap between consecutive children
    pub cspace: u32,
    /// Maximum span from first to last child
    pub cbspan: u32,
    /// Minimum age at marriage
    pub yngmar: u32,
    /// Maximum age at marriage
    pub oldmar: u32,
    pub oldmom: u32,
    pub yngmom: u32,
    pub yngdad: u32,
    pub olddad: u32,
    /// Maximum number of spouses
    pub wedder: u32,
    pub mxchildmom: u32,
    pub mxchilddad: u32,
    /// Maximum age for an unmarried person
    pub oldunm: u32,
    /// Estimate missing or partial dates
    pub estimate_age: bool,
    /// Report text-only birth and death dates
    pub invdate: bool,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        VerifyOptions {
            oldage: 90,
            hwdif: 30,
            cspace: 8,
            cbspan: 25,
            yngmar: 17,
            oldmar: 50,
            oldmom: 48,
            yngmom: 17,
            yngdad: 18,
            olddad: 65,
            wedder: 3,
            mxchildmom: 12,
            mxchilddad: 15,
            oldunm: 99,
            estimate_age: false,
            invdate: true,
        }
    }
}

pub const OPTION_NAMES: &[&str] = &[
    "oldage",
    "hwdif",
    "cspace",
    "cbspan",
    "yngmar",
    "oldmar",
    "oldmom",
    "yngmom",
    "yngdad",
    "olddad",
    "wedder",
    "mxchildmom",
    "mxchilddad",
    "oldunm",
    "estimate_age",
    "invdate",
];

fn parse_number(key: &str, value: &str) -> Result<u32> {
    value.trim().parse::<u32>().map_err(|_| {
        VerifyError::config(format!(
            "{key} must be a non-negative whole number, got '{value}'"
        ))
    })
}

fn parse_switch(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(VerifyError::config(format!("{key} must be 0, 1, true or false, got '{value}'"))),
    }
}

impl VerifyOptions {
    /// Defaults overridden by every entry of `map`.
    pub fn from_option_map(map: &HashMap<String, String>) -> Result<Self> {
        let mut options = VerifyOptions::default();
        for (key, value) in map {
            options.apply(key, value)?;
        }
        Ok(options)
    }

    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let slot = match key {
            "estimate_age" => {
                self.estimate_age = parse_switch(key, value)?;
                return Ok(());
            }
            "invdate" => {
                self.invdate = parse_switch(key, value)?;
                return Ok(());
            }
            "oldage" => &mut self.oldage,
            "hwdif" => &mut self.hwdif,
            "cspace" => &mut self.cspace,
            "cbspan" => &mut self.cbspan,
            "yngmar" => &mut self.yngmar,
            "oldmar" => &mut self.oldmar,
            "oldmom" => &mut self.oldmom,
            "yngmom" => &mut self.yngmom,
            "yngdad" => &mut self.yngdad,
            "olddad" => &mut self.olddad,
            "wedder" => &mut self.wedder,
            "mxchildmom" => &mut self.mxchildmom,
            "mxchilddad" => &mut self.mxchilddad,
            "oldunm" => &mut self.oldunm,
            _ => return Err(VerifyError::config(format!("unknown option '{key}'"))),
        };
        *slot = parse_number(key, value)?;
        Ok(())
    }

    /// Applies `key=value` assignments in order.
    pub fn apply_assignments(&mut self, assignments: &[String]) -> Result<()> {
        for assignment in assignments {
            let (key, value) = assignment.split_once('=').ok_or_else(|| {
                VerifyError::config(format!("expected key=value, got '{assignment}'"))
            })?;
            self.apply(key.trim(), value)?;
        }
        Ok(())
    }

    /// Current value of every option, in display order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let switch = |b: bool| if b { "1".to_string() } else { "0".to_string() };
        vec![
            ("oldage", self.oldage.to_string()),
            ("hwdif", self.hwdif.to_string()),
            ("cspace", self.cspace.to_string()),
            ("cbspan", self.cbspan.to_string()),
            ("yngmar", self.yngmar.to_string()),
            ("oldmar", self.oldmar.to_string()),
            ("oldmom", self.oldmom.to_string()),
            ("yngmom", self.yngmom.to_string()),
            ("yngdad", self.yngdad.to_string()),
            ("olddad", self.olddad.to_string()),
            ("wedder", self.wedder.to_string()),
            ("mxchildmom", self.mxchildmom.to_string()),
            ("mxchilddad", self.mxchilddad.to_string()),
            ("oldunm", self.oldunm.to_string()),
            ("estimate_age", switch(self.estimate_age)),
            ("invdate", switch(self.invdate)),
        ]
    }

    /// Default location: `<config dir>/kinverify/options.toml`.
    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "kinverify").ok_or(VerifyError::NoDataDir)?;
        Ok(dirs.config_dir().join("options.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Reads the options file, falling back to defaults when it is missing
    /// or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return VerifyOptions::default();
        }
        match VerifyOptions::load(path) {
            Ok(options) => options,
            Err(e) => {
                tracing::warn!("ignoring options file {}: {e}", path.display());
                VerifyOptions::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        tracing::debug!("saved options to {}", path.display());
        Ok(())
    }
}

/// Options file location: explicit, else the user config dir.
pub fn options_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => VerifyOptions::default_path().ok(),
    }
}

/// Options from the options file, then the command-line switches, then
/// `--set` assignments in order.
pub fn resolve_options(args: &RuleArgs) -> Result<(VerifyOptions, Option<PathBuf>)> {
    let path = options_path(args.options_file.as_deref());
    let mut options = path
        .as_deref()
        .map(VerifyOptions::load_or_default)
        .unwrap_or_default();

    if args.estimate_dates {
        options.estimate_age = true;
    }
    if args.no_invalid_dates {
        options.invdate = false;
    }
    options.apply_assignments(&args.set)?;
    Ok((options, path))
}

/// Everything a `check` run needs, resolved from the command line and the
/// options file.
pub struct Config {
    pub database: PathBuf,
    pub options: VerifyOptions,
    pub options_path: Option<PathBuf>,
    pub json_output: bool,
    pub plain_output: bool,
    pub verbose: bool,
    pub progressive: bool,
    pub hide_marked: bool,
    pub use_ignores: bool,
    pub save_options: bool,
}

impl Config {
    pub fn from_check_args(args: &CheckArgs) -> Result<Self> {
        let (options, options_path) = resolve_options(&args.rules)?;

        Ok(Config {
            database: args.database.clone(),
            options,
            options_path,
            json_output: args.json,
            plain_output: args.plain,
            verbose: args.verbose,
            progressive: args.progress,
            hide_marked: args.hide_marked,
            use_ignores: !args.no_ignores,
            save_options: args.save_options,
        })
    }

    /// Writes the effective options back when asked to.
    pub fn persist_options(&self) -> Result<()> {
        match (&self.options_path, self.save_options) {
            (Some(path), true) => self.options.save(path),
            (None, true) => Err(VerifyError::NoDataDir),
            _ => Ok(()),
        }
    }
}
