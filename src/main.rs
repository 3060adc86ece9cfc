//! grcrag - command-line entry point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use grcrag::{
    assistant::Assistant,
    cli::{Args, Commands, Config, SettingsCommand, Verbosity},
    doctor::Doctor,
    logging,
    rag::RagEngine,
    roles::Role,
    session::ChatSessions,
    settings::Upsert,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let verbosity = args.verbosity();

    let mut config = Config::load(args.config.clone()).context("Failed to load configuration")?;
    if let Some(level) = verbosity.log_level() {
        config.logging.level = level.to_string();
    }
    logging::init(&config.logging)?;

    match &args.command {
        Commands::Status => show_status(&config).await?,
        Commands::Index => run_index(&config, verbosity).await?,
        Commands::Search { query, role, k } => run_search(&config, query, *role, *k).await?,
        Commands::Chat {
            prompt,
            role,
            session,
            no_stream,
        } => {
            let session_id = session.clone().unwrap_or_else(ChatSessions::new_session_id);
            let assistant = build_assistant(&config)?;
            match prompt {
                Some(prompt) => ask_once(&assistant, &session_id, *role, prompt, !no_stream).await?,
                None => run_interactive(&assistant, &config, &session_id, *role, !no_stream).await?,
            }
        }
        Commands::Settings { action } => run_settings(&config, action)?,
        Commands::Config => show_config(&config)?,
        Commands::Doctor => run_doctor(&config).await?,
    }

    Ok(())
}

fn build_assistant(config: &Config) -> Result<Assistant> {
    let engine = Arc::new(RagEngine::from_config(config)?);
    Ok(Assistant::from_config(config, engine)?)
}

async fn show_status(config: &Config) -> Result<()> {
    let engine = RagEngine::from_config(config)?;
    let indexed = engine.status().await;

    let state = if indexed {
        format!("indexed ({} chunks)", engine.store().len().await).green()
    } else {
        "empty".yellow()
    };
    println!("Vector index: {}", state);
    println!("Documents:    {}", engine.docs_path().display());
    println!("Store file:   {}", engine.store().path().display());
    Ok(())
}

async fn run_index(config: &Config, verbosity: Verbosity) -> Result<()> {
    let engine = RagEngine::from_config(config)?;

    let spinner = if verbosity.show_progress() {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Indexing {}", engine.docs_path().display()));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let outcome = engine.reindex().await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let report = outcome.context("Re-index failed")?;
    println!(
        "{} {} chunks from {} of {} files ({} skipped)",
        "Indexed".green().bold(),
        report.count,
        report.files_indexed,
        report.files_found,
        report.files_skipped
    );
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}

async fn run_search(config: &Config, query: &str, role: Role, k: Option<usize>) -> Result<()> {
    let engine = RagEngine::from_config(config)?;
    let k = k.unwrap_or(engine.options().top_k);

    let hits = engine.search_scored(query, role, k).await?;
    if hits.is_empty() {
        println!("{}", "No matching chunks.".yellow());
        return Ok(());
    }

    for (i, hit) in hits.iter().enumerate() {
        println!(
            "{} {} [{}] score {:.3}",
            format!("#{}", i + 1).cyan().bold(),
            hit.metadata.source,
            hit.topic,
            hit.score
        );
        println!("{}\n", hit.text);
    }
    Ok(())
}

async fn ask_once(
    assistant: &Assistant,
    session_id: &str,
    role: Role,
    prompt: &str,
    stream: bool,
) -> Result<()> {
    if !stream {
        let answer = assistant.ask(session_id, role, prompt).await?;
        println!("{}", answer.reply);
        print_sources(&answer.sources);
        return Ok(());
    }

    let mut answer = assistant.ask_stream(session_id, role, prompt).await?;
    let mut stdout = std::io::stdout();
    while let Some(fragment) = answer.fragments.recv().await {
        write!(stdout, "{}", fragment?)?;
        stdout.flush()?;
    }
    println!();
    print_sources(&answer.sources);
    Ok(())
}

fn print_sources(sources: &[String]) {
    if !sources.is_empty() {
        println!("{} {}", "Sources:".dimmed(), sources.join(", ").dimmed());
    }
}

async fn run_interactive(
    assistant: &Assistant,
    config: &Config,
    session_id: &str,
    role: Role,
    stream: bool,
) -> Result<()> {
    let mut editor = DefaultEditor::new()?;
    let history_path = config.state_dir().join("chat_history");
    let _ = editor.load_history(&history_path);

    println!(
        "{} model {} as {} (session {})",
        "grcrag chat".bold(),
        assistant.chat_model(),
        role,
        session_id
    );
    println!("Ctrl-D to quit.\n");

    loop {
        let line = match editor.readline(&format!("{} ", ">".cyan())) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        let prompt = line.trim();
        if prompt.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(prompt);

        if let Err(e) = ask_once(assistant, session_id, role, prompt, stream).await {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
        }
        println!();
    }

    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let _ = editor.save_history(&history_path);
    Ok(())
}

fn run_settings(config: &Config, action: &SettingsCommand) -> Result<()> {
    let settings = grcrag::settings::SettingsStore::new(config.settings_path());

    match action {
        SettingsCommand::Get { key } => match settings.get(key)? {
            Some(value) => println!("{}", value),
            None => {
                eprintln!("{} is not set", key);
                std::process::exit(1);
            }
        },
        SettingsCommand::Set { key, value } => {
            let verb = match settings.set(key, value)? {
                Upsert::Created => "Created",
                Upsert::Updated => "Updated",
            };
            println!("{} {} = {}", verb.green(), key, value);
        }
        SettingsCommand::List => {
            for (key, setting) in settings.all()? {
                println!(
                    "{:<16} {}  {}",
                    key,
                    setting.value,
                    format!("(updated {})", setting.updated_at.format("%Y-%m-%d %H:%M")).dimmed()
                );
            }
        }
    }
    Ok(())
}

fn show_config(config: &Config) -> Result<()> {
    println!("{}\n", "grcrag configuration".bold());
    println!("{}", toml::to_string_pretty(config)?);
    println!("Ollama URL:   {}", config.ollama_url());
    println!("Vector store: {}", config.vector_db_path().display());
    println!("Settings:     {}", config.settings_path().display());
    Ok(())
}

async fn run_doctor(config: &Config) -> Result<()> {
    let doctor = Doctor::new(config)?;
    let checks = doctor.run_diagnostics().await;
    Doctor::display_results(&checks);

    std::process::exit(if Doctor::overall_status(&checks) { 0 } else { 1 });
}
