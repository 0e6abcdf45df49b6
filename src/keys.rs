//! Credential bootstrap: fetch a remote secrets file and load it into the
//! process environment.

use std::fmt;
use std::path::Path;

use thiserror::Error;
use tokio::fs;

/// Which of the recognized API keys are present in the environment.
///
/// Presence only; values are never captured or rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyReport {
    pub anthropic: bool,
    pub openai: bool,
    pub gemini: bool,
    pub deepseek: bool,
}

impl KeyReport {
    /// Probe the process environment for the recognized key variables.
    /// An empty value counts as absent.
    pub fn from_env() -> Self {
        let set = |name: &str| std::env::var(name).is_ok_and(|v| !v.is_empty());
        Self {
            anthropic: set("ANTHROPIC_API_KEY"),
            openai: set("OPENAI_API_KEY"),
            gemini: set("GEMINI_API_KEY"),
            deepseek: set("DEEPSEEK_API_KEY"),
        }
    }
}

impl fmt::Display for KeyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let yes_no = |set: bool| if set { "Yes" } else { "No" };
        writeln!(f, "Anthropic API key set? = {}", yes_no(self.anthropic))?;
        writeln!(f, "OpenAI API key set? = {}", yes_no(self.openai))?;
        writeln!(f, "Gemini API key set? = {}", yes_no(self.gemini))?;
        write!(f, "DeepSeek API key set? = {}", yes_no(self.deepseek))
    }
}

/// Errors from the credential bootstrap.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("failed to fetch secrets file: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("failed to write secrets file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to load secrets file: {0}")]
    Env(#[from] dotenvy::Error),
}

/// Fetch a secrets file from `url`, save it as `.env` in the working
/// directory, load it into the process environment, and report which API
/// keys are now set.
///
/// The report is printed to stdout (presence only) and returned.
pub async fn load_api_keys(url: &str) -> Result<KeyReport, KeyError> {
    load_api_keys_to(url, Path::new(".env")).await
}

/// Like [`load_api_keys`], with an explicit destination for the saved file.
pub async fn load_api_keys_to(url: &str, path: &Path) -> Result<KeyReport, KeyError> {
    let body = reqwest::get(url).await?.error_for_status()?.bytes().await?;
    fs::write(path, &body).await?;

    // Does not override variables already set in the environment.
    dotenvy::from_path(path)?;

    let report = KeyReport::from_env();
    println!("{report}");
    Ok(report)
}
