use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use workflow_builder::api::{HttpBackend, WorkflowBackend};
use workflow_builder::app::App;
use workflow_builder::config::Config;
use workflow_builder::editor::EditorSession;
use workflow_builder::logging;
use workflow_builder::ui::{install_panic_hook, NotificationLevel};

#[derive(Parser)]
#[command(name = "workflow-builder")]
#[command(about = "Build and configure workflow steps from the terminal")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Workflow to edit (overrides server.workflow_id)
    #[arg(short, long)]
    workflow: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the editor (default)
    Edit {
        /// Start with an empty canvas instead of loading the stored workflow
        #[arg(long)]
        empty: bool,
    },

    /// Print the stored workflow
    Show,

    /// Write the effective configuration to .workflow-builder/config.toml
    InitConfig {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(id) = cli.workflow {
        config.server.workflow_id = id;
    }

    let command = cli.command.unwrap_or(Commands::Edit { empty: false });
    let is_tui_mode = matches!(command, Commands::Edit { .. });

    // Kept alive until exit so buffered log lines are flushed
    let logging_handle = logging::init_logging(&config, is_tui_mode, cli.debug)?;

    match command {
        Commands::Edit { empty } => {
            run_tui(config, empty, logging_handle.log_file_path.clone()).await?;
        }
        Commands::Show => cmd_show(&config).await?,
        Commands::InitConfig { force } => cmd_init_config(&config, force)?,
    }

    Ok(())
}

/// Load the stored workflow into a fresh session.
///
/// A failed fetch still opens the editor, empty, with the reason shown.
async fn load_session(
    backend: &dyn WorkflowBackend,
    empty: bool,
) -> (EditorSession, Option<(String, NotificationLevel)>) {
    let mut session = EditorSession::new();
    if empty {
        return (session, None);
    }

    let snapshot = match backend.fetch().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::error!(error = %e, "Could not load stored workflow");
            let message = format!("❌ Could not load workflow: {}", e);
            return (session, Some((message, NotificationLevel::Error)));
        }
    };

    match session.restore(snapshot) {
        Ok(report) if report.skipped_steps + report.skipped_configs > 0 => {
            let message = format!(
                "Loaded {} steps ({} steps and {} configs skipped)",
                report.steps, report.skipped_steps, report.skipped_configs
            );
            (session, Some((message, NotificationLevel::Info)))
        }
        Ok(report) => {
            let message = format!("Loaded {} steps", report.steps);
            (session, Some((message, NotificationLevel::Info)))
        }
        Err(e) => {
            tracing::error!(error = %e, "Stored workflow is inconsistent");
            let message = format!("❌ Could not load workflow: {}", e);
            (session, Some((message, NotificationLevel::Error)))
        }
    }
}

async fn run_tui(config: Config, empty: bool, log_file_path: Option<PathBuf>) -> Result<()> {
    let backend: Arc<dyn WorkflowBackend> = Arc::new(
        HttpBackend::from_config(&config.server).context("Failed to create HTTP client")?,
    );

    let (session, notice) = load_session(backend.as_ref(), empty).await;

    install_panic_hook();
    let mut app = App::new(config, session, backend);
    if let Some((message, level)) = notice {
        app.notify(message, level);
    }
    let result = app.run().await;

    // Print log file path on exit if logs were written
    if let Some(log_path) = log_file_path {
        if log_path.metadata().is_ok_and(|m| m.len() > 0) {
            eprintln!("Session log: {}", log_path.display());
        }
    }

    result
}

async fn cmd_show(config: &Config) -> Result<()> {
    let backend = HttpBackend::from_config(&config.server)?;
    let snapshot = backend
        .fetch()
        .await
        .with_context(|| format!("Failed to fetch workflow from {}", backend.endpoint()))?;

    let mut session = EditorSession::new();
    let report = session.restore(snapshot)?;

    if session.steps().is_empty() {
        println!("Workflow {} has no steps", config.server.workflow_id);
        return Ok(());
    }

    println!(
        "Workflow {} ({} steps)",
        config.server.workflow_id,
        session.steps().len()
    );
    println!("{}", "─".repeat(60));

    for ((id, label), view) in session.steps().labels().into_iter().zip(session.steps().list()) {
        println!("{:>3}. {:<24} [{}]", view.order + 1, label, id);
        match session.configs().entry(&id) {
            Some(entry) => println!("     {}", serde_json::to_string(entry)?),
            None => println!("     (not configured)"),
        }
    }

    if report.skipped_steps > 0 || report.skipped_configs > 0 {
        println!();
        println!(
            "Skipped {} steps and {} configs the editor does not understand",
            report.skipped_steps, report.skipped_configs
        );
    }

    Ok(())
}

fn cmd_init_config(config: &Config, force: bool) -> Result<()> {
    let path = Config::local_config_path();
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let written = config.save()?;
    println!("Wrote {}", written.display());
    Ok(())
}
