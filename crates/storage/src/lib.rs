//! TOML configuration: built-in defaults, a global file, a local override,
//! resolved once into an immutable `RedactionConfig`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use directories::ProjectDirs;
use pdfanon_core::{DEFAULT_REPLACEMENT, RedactionConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const GLOBAL_CONFIG_FILE: &str = "config.toml";
pub const LOCAL_CONFIG_FILE: &str = "pdfanon.toml";

/// Written by `pdfanon config --init` when no global file exists yet.
pub const SAMPLE_CONFIG: &str = r#"# Replacement drawn in place of every redacted span.
replacement = "[REDACTED]"

# Whole-word, case-insensitive. Multi-word entries match across words on one line.
terms = ["John Doe", "Secret Company", "123 Main St"]

[heuristics]
# Letters mixed with digits, e.g. abc123
alphanumeric_words = true
# Letters with a symbol inside the token, e.g. jane@mail.com
letters_special_chars = true
# Digit-only codes of six or more characters, e.g. 20240117
numeric_codes = false
"#;

/// One configuration layer as written on disk. Absent keys defer to the
/// layer below.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms: Option<Vec<String>>,
    pub heuristics: HeuristicsSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeuristicsSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alphanumeric_words: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letters_special_chars: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric_codes: Option<bool>,
}

impl HeuristicsSection {
    fn merge(self, over: Self) -> Self {
        Self {
            alphanumeric_words: over.alphanumeric_words.or(self.alphanumeric_words),
            letters_special_chars: over.letters_special_chars.or(self.letters_special_chars),
            numeric_codes: over.numeric_codes.or(self.numeric_codes),
        }
    }
}

impl ConfigFile {
    /// Built-in bottom layer.
    pub fn defaults() -> Self {
        Self {
            replacement: Some(DEFAULT_REPLACEMENT.to_string()),
            terms: Some(Vec::new()),
            heuristics: HeuristicsSection {
                alphanumeric_words: Some(true),
                letters_special_chars: Some(true),
                numeric_codes: Some(false),
            },
        }
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("parse configuration TOML")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("load config {}", path.display()))
    }

    pub fn load_if_exists(path: &Path) -> anyhow::Result<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    /// `over` wins: its term list replaces ours when present, heuristic
    /// flags merge key by key.
    pub fn merge(self, over: Self) -> Self {
        Self {
            replacement: over.replacement.or(self.replacement),
            terms: over.terms.or(self.terms),
            heuristics: self.heuristics.merge(over.heuristics),
        }
    }

    /// Missing keys fall back to the built-in defaults.
    pub fn resolve(&self) -> RedactionConfig {
        let merged = Self::defaults().merge(self.clone());
        let fallback = RedactionConfig::default();
        RedactionConfig {
            terms: merged.terms.unwrap_or(fallback.terms),
            replacement: merged.replacement.unwrap_or(fallback.replacement),
            anonymize_alphanumeric: merged.heuristics.alphanumeric_words.unwrap_or(false),
            anonymize_letters_special: merged.heuristics.letters_special_chars.unwrap_or(false),
            anonymize_numeric_codes: merged.heuristics.numeric_codes.unwrap_or(false),
        }
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        toml::to_string_pretty(self).context("serialize configuration")
    }
}

impl From<&RedactionConfig> for ConfigFile {
    fn from(config: &RedactionConfig) -> Self {
        Self {
            replacement: Some(config.replacement.clone()),
            terms: Some(config.terms.clone()),
            heuristics: HeuristicsSection {
                alphanumeric_words: Some(config.anonymize_alphanumeric),
                letters_special_chars: Some(config.anonymize_letters_special),
                numeric_codes: Some(config.anonymize_numeric_codes),
            },
        }
    }
}

/// Command-line values applied on top of the merged files.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub terms: Vec<String>,
    pub replacement: Option<String>,
    pub no_heuristics: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    global: Option<PathBuf>,
    local: Option<PathBuf>,
    local_required: bool,
}

impl ConfigLoader {
    pub fn new(global: Option<PathBuf>, local: Option<PathBuf>) -> Self {
        Self {
            global,
            local,
            local_required: false,
        }
    }

    /// Global file in the platform config dir, local file in the working
    /// directory.
    pub fn discover() -> anyhow::Result<Self> {
        let global = global_config_path()?;
        let cwd = std::env::current_dir().context("get cwd")?;
        Ok(Self::new(Some(global), Some(cwd.join(LOCAL_CONFIG_FILE))))
    }

    /// Replaces the local layer with an explicit file, which must exist.
    pub fn with_local_override(mut self, path: PathBuf) -> Self {
        self.local = Some(path);
        self.local_required = true;
        self
    }

    pub fn global_path(&self) -> Option<&Path> {
        self.global.as_deref()
    }

    pub fn local_path(&self) -> Option<&Path> {
        self.local.as_deref()
    }

    /// Global then local, merged. Missing optional files are skipped.
    pub fn load(&self) -> anyhow::Result<ConfigFile> {
        let mut merged = ConfigFile::default();
        if let Some(path) = &self.global
            && let Some(layer) = ConfigFile::load_if_exists(path)?
        {
            debug!(path = %path.display(), "loaded global config");
            merged = merged.merge(layer);
        }
        if let Some(path) = &self.local {
            let layer = if self.local_required {
                Some(ConfigFile::load(path)?)
            } else {
                ConfigFile::load_if_exists(path)?
            };
            if let Some(layer) = layer {
                debug!(path = %path.display(), "loaded local config");
                merged = merged.merge(layer);
            }
        }
        Ok(merged)
    }

    /// Loads both layers, applies `overrides` and validates the result.
    pub fn resolve(&self, overrides: &Overrides) -> anyhow::Result<RedactionConfig> {
        let file = self.load()?;
        resolve(&file, overrides)
    }

    /// Writes [`SAMPLE_CONFIG`] to the global path unless a file is already
    /// there. Returns the path and whether it was written.
    pub fn init_global(&self) -> anyhow::Result<(PathBuf, bool)> {
        let path = self
            .global
            .clone()
            .context("no global config location on this platform")?;
        if path.exists() {
            return Ok((path, false));
        }
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("create config dir {}", dir.display()))?;
        }
        fs::write(&path, SAMPLE_CONFIG)
            .with_context(|| format!("write config {}", path.display()))?;
        Ok((path, true))
    }
}

pub fn global_config_path() -> anyhow::Result<PathBuf> {
    let project_dirs =
        ProjectDirs::from("dev", "pdfanon", "pdfanon").context("resolve project dirs")?;
    Ok(project_dirs.config_dir().join(GLOBAL_CONFIG_FILE))
}

pub fn resolve(file: &ConfigFile, overrides: &Overrides) -> anyhow::Result<RedactionConfig> {
    let mut config = file.resolve();
    config.terms.extend(overrides.terms.iter().cloned());
    if let Some(replacement) = &overrides.replacement {
        config.replacement = replacement.clone();
    }
    if overrides.no_heuristics {
        config.anonymize_alphanumeric = false;
        config.anonymize_letters_special = false;
        config.anonymize_numeric_codes = false;
    }
    config.validate()?;
    config.normalize();
    Ok(config)
}
