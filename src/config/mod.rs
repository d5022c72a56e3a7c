use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Startup configuration loaded once from disk (or the environment) and
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// GitHub token with `notifications` scope.
    pub token: String,
}

/// Per-run options built once from the CLI flags and passed explicitly to
/// every component; there is no global mutable state.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Requested notification count; `None` means fetch until exhausted.
    pub requested: Option<usize>,
    pub participating: bool,
    pub include_read: bool,
    pub exclude: Option<Regex>,
    pub include: Option<Regex>,
    /// Debug mode turns recoverable resolver skips into fatal errors.
    pub debug: bool,
}

impl RunOptions {
    /// True when an exclude or include pattern is active. Mark-all-read is
    /// refused in that case since it would touch hidden rows.
    pub fn has_pattern(&self) -> bool {
        self.exclude.is_some() || self.include.is_some()
    }
}

pub fn config_dir() -> Result<PathBuf> {
    let dir = directories::ProjectDirs::from("", "", "pigeonhole")
        .context("Could not determine config directory")?
        .config_dir()
        .to_path_buf();
    Ok(dir)
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load the config file, falling back to the `GITHUB_TOKEN` environment
/// variable when no file exists. The env var wins over the file when both
/// are present.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    let env_token = std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty());

    if !path.exists() {
        if let Some(token) = env_token {
            return Ok(Config { token });
        }
        anyhow::bail!(
            "Config file not found at {} and GITHUB_TOKEN is unset. Run `pigeonhole --init` to create one.",
            path.display()
        );
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", path.display()))?;

    if let Some(token) = env_token {
        config.token = token;
    }

    Ok(config)
}

pub fn init_wizard() -> Result<()> {
    use std::io::{self, Write};

    println!("Pigeonhole Configuration Wizard");
    println!("===============================\n");

    let config_path = default_config_path()?;
    if config_path.exists() {
        print!(
            "Config already exists at {}. Overwrite? [y/N] ",
            config_path.display()
        );
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    print!("GitHub token with `notifications` scope (https://github.com/settings/tokens): ");
    io::stdout().flush()?;
    let mut token = String::new();
    io::stdin().read_line(&mut token)?;

    let config = Config {
        token: token.trim().to_string(),
    };

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Write config with restricted permissions
    let content = toml::to_string_pretty(&config)?;
    std::fs::write(&config_path, content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&config_path, std::fs::Permissions::from_mode(0o600))?;
    }

    println!("\nConfig saved to {}", config_path.display());
    println!("Run `pigeonhole` to open your notification inbox.");

    Ok(())
}
