//! Buffer defaults loaded from rc files.
//!
//! An rc file holds flag tokens, one or more per line. Blank lines and lines
//! starting with `#` are ignored, as are tokens this crate does not know.
//!
//! ```text
//! # ropeline defaults
//! --line-delimiter crlf
//! --perf
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// How a buffer picks its line delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimiterMode {
    /// Detect from the content.
    Auto,
    Lf,
    Crlf,
}

impl DelimiterMode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Lf => "lf",
            Self::Crlf => "crlf",
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BufferConfig {
    pub line_delimiter: Option<DelimiterMode>,
    pub perf: bool,
}

impl BufferConfig {
    /// Merge two configs. Options set in `other` win; flags are combined.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            line_delimiter: other.line_delimiter.or(self.line_delimiter),
            perf: self.perf || other.perf,
        }
    }

    /// Apply settings that are shared by every buffer in the process. Timing
    /// is switched on or off to match `perf`.
    pub fn apply_global(&self) {
        crate::perf::set_enabled(self.perf);
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("ropeline").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("ropeline")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("ropeline").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("ropeline")
                .join("config");
        }
    }

    local_override_path()
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".ropelinerc")
}

/// Load the global config overlaid with the local override, if present, and
/// apply its process-wide settings.
///
/// # Errors
/// Returns an error if either file exists but cannot be read.
pub fn load_effective_config() -> Result<BufferConfig> {
    let global = load_config(&global_config_path())?;
    let local = load_config(&local_override_path())?;
    let config = global.union(&local);
    config.apply_global();
    Ok(config)
}

/// Read flags from `path`. A missing file yields the default config.
///
/// # Errors
/// Returns an error if the file exists but cannot be read.
pub fn load_config(path: &Path) -> Result<BufferConfig> {
    if !path.exists() {
        return Ok(BufferConfig::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    let config = parse_config_tokens(&tokens);
    tracing::debug!(path = %path.display(), ?config, "loaded config");
    Ok(config)
}

/// Write `config` to `path`, creating parent directories.
///
/// # Errors
/// Returns an error if the directory or file cannot be written.
pub fn save_config(path: &Path, config: &BufferConfig) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# ropeline defaults".to_string());
    if let Some(mode) = config.line_delimiter {
        lines.push(format!("--line-delimiter {}", mode.as_str()));
    }
    if config.perf {
        lines.push("--perf".to_string());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

/// Delete the config at `path` if it exists.
///
/// # Errors
/// Returns an error if the file exists but cannot be removed.
pub fn clear_config(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

pub fn parse_config_tokens(tokens: &[String]) -> BufferConfig {
    let mut config = BufferConfig::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        if token == "--perf" {
            config.perf = true;
        } else if token == "--line-delimiter" {
            if let Some(next) = tokens.get(i + 1) {
                config.line_delimiter = parse_delimiter_mode(next);
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--line-delimiter=") {
            config.line_delimiter = parse_delimiter_mode(value);
        }
        i += 1;
    }
    config
}

fn parse_delimiter_mode(s: &str) -> Option<DelimiterMode> {
    match s.to_ascii_lowercase().as_str() {
        "auto" => Some(DelimiterMode::Auto),
        "lf" => Some(DelimiterMode::Lf),
        "crlf" => Some(DelimiterMode::Crlf),
        _ => None,
    }
}
