//! Doctor command for system diagnostics
//!
//! Checks everything a re-index or chat needs: the Ollama server, both
//! models, the document root and the state directory.

use colored::Colorize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::Config;
use crate::documents::find_pdf_files;
use crate::errors::Result;
use crate::rag::store::VectorStore;
use crate::settings::SettingsStore;
use crate::streaming::ChatClient;

/// Health check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Pass,
    Warn(String),
    Fail(String),
}

/// Individual health check
#[derive(Debug)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
}

impl HealthCheck {
    fn new(name: &str, status: HealthStatus) -> Self {
        Self {
            name: name.to_string(),
            status,
        }
    }
}

/// Doctor diagnostics system
pub struct Doctor {
    client: ChatClient,
    chat_model: String,
    embed_model: String,
    docs_path: PathBuf,
    state_dir: PathBuf,
    vector_db_path: PathBuf,
}

impl Doctor {
    pub fn new(config: &Config) -> Result<Self> {
        let client = ChatClient::with_config(
            &config.ollama_url(),
            &config.ollama.chat_model,
            Duration::from_secs(5),
        )?;
        let settings = SettingsStore::new(config.settings_path());

        Ok(Self {
            client,
            chat_model: config.ollama.chat_model.clone(),
            embed_model: config.ollama.embed_model.clone(),
            docs_path: settings.docs_path(&config.default_docs_path()),
            state_dir: config.state_dir(),
            vector_db_path: config.vector_db_path(),
        })
    }

    /// Run all health checks
    pub async fn run_diagnostics(&self) -> Vec<HealthCheck> {
        let mut checks = vec![self.check_ollama_api().await];

        // Model checks only make sense with a reachable server
        if checks[0].status == HealthStatus::Pass {
            let installed = self.client.list_models().await;
            checks.push(model_check("Chat Model", &self.chat_model, &installed));
            checks.push(model_check("Embedding Model", &self.embed_model, &installed));
        }

        checks.push(check_docs_path(&self.docs_path));
        checks.push(check_state_dir(&self.state_dir));
        checks.push(self.check_index().await);
        checks
    }

    async fn check_ollama_api(&self) -> HealthCheck {
        match self.client.health_check().await {
            Ok(true) => HealthCheck::new("Ollama API", HealthStatus::Pass),
            Ok(false) => HealthCheck::new(
                "Ollama API",
                HealthStatus::Fail(format!(
                    "Not reachable at {}. Start with: ollama serve",
                    self.client.base_url()
                )),
            ),
            Err(e) => HealthCheck::new(
                "Ollama API",
                HealthStatus::Fail(format!("Error checking Ollama: {}", e)),
            ),
        }
    }

    async fn check_index(&self) -> HealthCheck {
        let store = VectorStore::new(self.vector_db_path.clone());
        let entries = store.len().await;

        if entries == 0 {
            HealthCheck::new(
                "Vector Index",
                HealthStatus::Warn("Index is empty. Run: grcrag index".to_string()),
            )
        } else {
            HealthCheck::new("Vector Index", HealthStatus::Pass)
        }
    }

    /// Display diagnostics results
    pub fn display_results(checks: &[HealthCheck]) {
        println!("\n{}\n", "grcrag diagnostics".bold());
        println!("{:<20} Status", "Check");
        println!("{}", "=".repeat(50));

        for check in checks {
            let line = match &check.status {
                HealthStatus::Pass => "PASS".green().to_string(),
                HealthStatus::Warn(msg) => format!("WARN: {}", msg).yellow().to_string(),
                HealthStatus::Fail(msg) => format!("FAIL: {}", msg).red().to_string(),
            };
            println!("{:<20} {}", check.name, line);
        }

        println!();
    }

    /// True unless some check failed
    pub fn overall_status(checks: &[HealthCheck]) -> bool {
        !checks.iter().any(|c| matches!(c.status, HealthStatus::Fail(_)))
    }
}

/// Ollama reports tags (`llama3:latest`); a bare name matches its `:latest`
fn model_installed(wanted: &str, installed: &[String]) -> bool {
    installed.iter().any(|name| {
        name == wanted || (!wanted.contains(':') && name.split(':').next() == Some(wanted))
    })
}

fn model_check(label: &str, wanted: &str, installed: &Result<Vec<String>>) -> HealthCheck {
    match installed {
        Ok(models) if model_installed(wanted, models) => HealthCheck::new(label, HealthStatus::Pass),
        Ok(_) => HealthCheck::new(
            label,
            HealthStatus::Fail(format!("'{}' not installed. Run: ollama pull {}", wanted, wanted)),
        ),
        Err(e) => HealthCheck::new(label, HealthStatus::Warn(format!("Cannot list models: {}", e))),
    }
}

fn check_docs_path(root: &Path) -> HealthCheck {
    if !root.is_dir() {
        return HealthCheck::new(
            "Documents",
            HealthStatus::Warn(format!("{} does not exist", root.display())),
        );
    }

    match find_pdf_files(root).len() {
        0 => HealthCheck::new(
            "Documents",
            HealthStatus::Warn(format!("No PDF files under {}", root.display())),
        ),
        _ => HealthCheck::new("Documents", HealthStatus::Pass),
    }
}

fn check_state_dir(dir: &Path) -> HealthCheck {
    if let Err(e) = std::fs::create_dir_all(dir) {
        return HealthCheck::new(
            "State Directory",
            HealthStatus::Fail(format!("Cannot create {}: {}", dir.display(), e)),
        );
    }

    let probe = dir.join(".grcrag_write_test");
    match std::fs::write(&probe, "test") {
        Ok(_) => {
            let _ = std::fs::remove_file(&probe);
            HealthCheck::new("State Directory", HealthStatus::Pass)
        }
        Err(_) => HealthCheck::new(
            "State Directory",
            HealthStatus::Fail(format!("No write permission in {}", dir.display())),
        ),
    }
}
