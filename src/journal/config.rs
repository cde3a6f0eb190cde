use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::VaultError;

pub const CONFIG_FILE_NAME: &str = "dayone-vault.toml";

pub const CONFIG_PATH_VAR: &str = "DAYONE_VAULT_CONFIG_PATH";
pub const ROOT_VAR: &str = "DAYONE_VAULT_ROOT";
pub const JOURNAL_FOLDER_VAR: &str = "DAYONE_VAULT_JOURNAL_FOLDER";
pub const JOURNAL_JSON_VAR: &str = "DAYONE_VAULT_JOURNAL_JSON";
pub const DEFAULT_TEXT_VAR: &str = "DAYONE_VAULT_DEFAULT_TEXT";
pub const CLEAN_OUTPUT_VAR: &str = "DAYONE_VAULT_CLEAN_OUTPUT";

/// Every environment variable the tool reads.
pub const ENV_VARS: &[&str] = &[
    CONFIG_PATH_VAR,
    ROOT_VAR,
    JOURNAL_FOLDER_VAR,
    JOURNAL_JSON_VAR,
    DEFAULT_TEXT_VAR,
    CLEAN_OUTPUT_VAR,
    crate::logging::LOG_ENV_VAR,
    crate::env_loader::HOME_VAR,
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    /// Vault root; also holds `photos/`, `pdfs/` and the export.
    pub root: PathBuf,
    /// Output folder, relative to `root` unless absolute.
    pub journal_folder: PathBuf,
    /// Export document, relative to `root` unless absolute.
    pub journal_json: PathBuf,
    /// Body used for entries that carry no text.
    pub default_text: String,
    /// Delete the output folder before converting.
    pub clean_output: bool,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            journal_folder: PathBuf::from("Journal"),
            journal_json: PathBuf::from("Journal.json"),
            default_text: String::new(),
            clean_output: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VaultConfig {
    pub journal: JournalConfig,
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct PartialVaultConfig {
    journal: Option<JournalConfig>,
}

fn lookup_string(lookup: &impl Fn(&str) -> Option<String>, var: &str) -> Option<String> {
    lookup(var)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn lookup_bool(lookup: &impl Fn(&str) -> Option<String>, var: &str, fallback: bool) -> bool {
    match lookup_string(lookup, var).as_deref() {
        Some("1" | "true" | "TRUE" | "yes" | "on") => true,
        Some("0" | "false" | "FALSE" | "no" | "off") => false,
        _ => fallback,
    }
}

fn apply_env_overrides(cfg: &mut VaultConfig, lookup: impl Fn(&str) -> Option<String>) {
    let journal = &mut cfg.journal;
    if let Some(root) = lookup_string(&lookup, ROOT_VAR) {
        journal.root = PathBuf::from(root);
    }
    if let Some(folder) = lookup_string(&lookup, JOURNAL_FOLDER_VAR) {
        journal.journal_folder = PathBuf::from(folder);
    }
    if let Some(json) = lookup_string(&lookup, JOURNAL_JSON_VAR) {
        journal.journal_json = PathBuf::from(json);
    }
    // Not trimmed through lookup_string: an intentionally blank default is allowed.
    if let Some(text) = lookup(DEFAULT_TEXT_VAR) {
        journal.default_text = text;
    }
    journal.clean_output = lookup_bool(&lookup, CLEAN_OUTPUT_VAR, journal.clean_output);
}

fn validate(cfg: &VaultConfig) -> Result<()> {
    let folder = &cfg.journal.journal_folder;
    if folder.as_os_str().is_empty() || folder == Path::new(".") {
        return Err(VaultError::InvalidConfig(
            "journal_folder must name a subfolder of the vault root".to_string(),
        )
        .into());
    }
    if cfg.journal.journal_json.as_os_str().is_empty() {
        return Err(VaultError::InvalidConfig("journal_json cannot be empty".to_string()).into());
    }
    Ok(())
}

fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Ok(custom) = env::var(CONFIG_PATH_VAR) {
        let trimmed = custom.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    let home = dirs::home_dir()?;
    Some(home.join(".config").join("dayone-vault").join("config.toml"))
}

fn merge_file_config(base: &mut VaultConfig, path: &Path, required: bool) -> Result<()> {
    if !path.exists() {
        if required {
            return Err(VaultError::InvalidConfig(format!("{} does not exist", path.display())).into());
        }
        return Ok(());
    }

    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let parsed: PartialVaultConfig = toml::from_str(&raw).map_err(|err| {
        VaultError::InvalidConfig(format!("failed to parse {}: {err}", path.display()))
    })?;
    if let Some(journal) = parsed.journal {
        base.journal = journal;
    }
    base.source = Some(path.to_path_buf());
    Ok(())
}

/// Defaults, then the TOML file, then `DAYONE_VAULT_*` overrides.
pub fn load_config(explicit: Option<&Path>) -> Result<VaultConfig> {
    let mut cfg = VaultConfig::default();
    if let Some(path) = resolve_config_path(explicit) {
        merge_file_config(&mut cfg, &path, explicit.is_some())?;
    }
    apply_env_overrides(&mut cfg, |var| env::var(var).ok());
    validate(&cfg)?;
    Ok(cfg)
}
