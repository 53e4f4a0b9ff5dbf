//! chesseye - photographed chess board to FEN
//!
//! Headless client for the board recognition API: runs predictions, shows
//! the evaluated position, submits corrections, switches the inference
//! backend and exports positions to the board editor.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info};

use chesseye_client::connection_check::check_connection;
use chesseye_client::editor_export::{generate_editor_url, SystemBrowserOpener};
use chesseye_client::error_filter::ErrorFilterRegistration;
use chesseye_client::prediction::{
    EvaluationThresholds, PredictionSession, PredictionStatus, RepredictOutcome,
};
use chesseye_client::services::service_selector::{next_service_for, service_display_name};
use chesseye_client::services::{ApiClient, ImageRef, PredictionGateway};
use chesseye_client::submission::SubmitOutcome;
use chesseye_common::config::{default_config_path, ConfigResolver, TomlConfig};
use chesseye_common::events::{ChessEyeEvent, EventBus, SubmissionState};
use chesseye_common::fen;
use chesseye_common::logging;

/// Command-line arguments for chesseye
#[derive(Parser, Debug)]
#[command(name = "chesseye")]
#[command(about = "Turn a photographed chess board into an editable FEN")]
#[command(version)]
struct Args {
    /// Config file (default: $CHESSEYE_CONFIG, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Board recognition API base URL (overrides $CHESSEYE_API_BASE_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Log level or filter directives (overrides the config file)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a FEN locally
    Validate { fen: String },

    /// Predict the position in a board photo
    Predict {
        image: PathBuf,

        /// Corrected FEN to apply to the prediction
        #[arg(long)]
        correct: Option<String>,

        /// Submit the corrected FEN
        #[arg(long, requires = "correct")]
        submit: bool,

        /// Open the corrected position in the board editor
        #[arg(long, requires = "correct")]
        open_editor: bool,
    },

    /// Predict, switch the inference service, then predict again
    Switch {
        image: PathBuf,

        /// Service to switch to (default: the next available one)
        #[arg(long)]
        service: Option<String>,
    },

    /// Show the active and available inference services
    Services,

    /// Check API, model and database health
    Health,

    /// Show prediction statistics and retraining status
    Stats,

    /// List recently submitted corrections
    Corrections {
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },

    /// Print the board editor URL for a FEN
    EditorUrl { fen: String },

    /// Write a config file with default values
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let resolver = ConfigResolver::new(args.config.clone());
    let mut config = resolver
        .resolve(args.api_url.as_deref())
        .context("Failed to load configuration")?;
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    logging::init_tracing(&config.logging).context("Failed to initialize logging")?;
    ErrorFilterRegistration::install();

    info!("chesseye {}", env!("CARGO_PKG_VERSION"));
    debug!(api_base_url = %config.api_base_url(), "Configuration loaded");

    let events = EventBus::default();

    match args.command {
        Command::Validate { fen } => validate(&fen),
        Command::Predict {
            image,
            correct,
            submit,
            open_editor,
        } => predict(&config, events, image, correct, submit, open_editor).await,
        Command::Switch { image, service } => switch(&config, events, image, service).await,
        Command::Services => services(&config).await,
        Command::Health => health(&config).await,
        Command::Stats => stats(&config).await,
        Command::Corrections { limit } => corrections(&config, limit).await,
        Command::EditorUrl { fen } => {
            println!("{}", generate_editor_url(&config.editor_base_url, &fen)?);
            Ok(())
        }
        Command::InitConfig { force } => init_config(args.config, force),
    }
}

fn validate(fen_text: &str) -> Result<()> {
    println!("Structure valid: {}", fen::is_structurally_valid(fen_text));
    println!("Full FEN valid:  {}", fen::validate_fen(fen_text));
    println!("Pieces:          {}", fen::count_pieces(fen_text));
    println!("Empty board:     {}", fen::is_empty_board(fen_text));
    match fen::position_validation_error(Some(fen_text)) {
        Some(error) => println!("Position:        {}", error),
        None => println!("Position:        playable"),
    }

    match fen::fen_to_matrix(fen_text) {
        Ok(matrix) => {
            println!();
            for rank in matrix {
                let row: Vec<&str> = rank
                    .iter()
                    .map(|square| if square.is_empty() { "." } else { square.as_str() })
                    .collect();
                println!("  {}", row.join(" "));
            }
        }
        Err(e) => println!("Parse error:     {}", e),
    }
    Ok(())
}

fn api_client(config: &TomlConfig) -> Result<ApiClient> {
    ApiClient::from_config(config).context("Failed to create API client")
}

fn print_session(session: &PredictionSession, thresholds: &EvaluationThresholds) {
    let prediction = session.prediction();
    let evaluation = session.evaluation(thresholds);

    if let Some(id) = prediction.prediction_id {
        println!("Prediction:   #{}", id);
    }
    println!("Status:       {}", evaluation.status());
    println!(
        "FEN:          {}",
        evaluation.current_fen.as_deref().unwrap_or("-")
    );
    println!("Pieces:       {}", evaluation.piece_count);
    if prediction.success && evaluation.confidence_score > 0.0 {
        println!("Confidence:   {}", evaluation.confidence_label());
    }
    if let Some(message) = evaluation.failure_message(thresholds, prediction.message.as_deref()) {
        println!("              {}", message);
    }
    if evaluation.has_valid_prediction {
        if let Some(error) = evaluation.position_validation_error {
            println!("Invalid position: {}", error);
        }
        if evaluation.status() == PredictionStatus::LowConfidence {
            println!("Low confidence prediction - please review carefully");
        }
    }
}

async fn start_session(
    config: &TomlConfig,
    client: &ApiClient,
    events: EventBus,
    image: PathBuf,
) -> Result<PredictionSession> {
    let status = check_connection(client).await;
    if let Some(message) = status.user_message() {
        eprintln!("{}\n", message);
    }

    PredictionSession::start(client, ImageRef::from_path(image), config, events)
        .await
        .context("Prediction failed")
}

async fn predict(
    config: &TomlConfig,
    events: EventBus,
    image: PathBuf,
    correct: Option<String>,
    submit: bool,
    open_editor: bool,
) -> Result<()> {
    let client = api_client(config)?;
    let thresholds = EvaluationThresholds::from_config(config);
    let session = start_session(config, &client, events.clone(), image).await?;

    if let Some(fen) = correct {
        session.set_corrected_fen(fen);
    }
    print_session(&session, &thresholds);

    if submit {
        if !session.evaluation(&thresholds).has_valid_prediction {
            bail!("No valid prediction to correct");
        }
        let mut rx = events.subscribe();

        match session.submit_correction(&client).await {
            SubmitOutcome::Submitted => println!("\n✓ Correction Submitted!"),
            SubmitOutcome::Skipped => bail!("Nothing to submit"),
            SubmitOutcome::Failed => bail!("Failed to submit correction"),
        }

        let wait = config.success_message_duration() + Duration::from_secs(1);
        let reached = tokio::time::timeout(wait, wait_for_redirect(&mut rx))
            .await
            .unwrap_or(false);
        if reached {
            let fen = session.corrected_fen().unwrap_or_default();
            println!(
                "Board editor: {}",
                generate_editor_url(&config.editor_base_url, &fen)?
            );
        }
    }

    if open_editor {
        session
            .submission()
            .open_external_editor(&SystemBrowserOpener, session.corrected_fen().as_deref())
            .await
            .context("Failed to open board editor")?;
    }

    session.submission().dispose();
    Ok(())
}

/// Block until the submission flow reaches `Redirect`
async fn wait_for_redirect(rx: &mut tokio::sync::broadcast::Receiver<ChessEyeEvent>) -> bool {
    loop {
        match rx.recv().await {
            Ok(ChessEyeEvent::SubmissionStateChanged {
                new_state: SubmissionState::Redirect,
                ..
            }) => return true,
            Ok(_) | Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => return false,
        }
    }
}

async fn switch(
    config: &TomlConfig,
    events: EventBus,
    image: PathBuf,
    service: Option<String>,
) -> Result<()> {
    let client = api_client(config)?;
    let thresholds = EvaluationThresholds::from_config(config);
    let session = start_session(config, &client, events, image).await?;

    println!("Before switch");
    print_session(&session, &thresholds);

    let target = match service {
        Some(service) => service,
        None => {
            let current = client
                .current_service()
                .await
                .context("Failed to load services")?;
            next_service_for(&current)
                .map(str::to_string)
                .context("Only one service available, nothing to switch to")?
        }
    };

    println!("\nSwitching to {}...", service_display_name(Some(&target)));
    match session.switch_and_repredict(&client, &target).await {
        RepredictOutcome::Replaced => {
            println!("\nAfter switch");
            print_session(&session, &thresholds);
            Ok(())
        }
        RepredictOutcome::Discarded => Ok(()),
        RepredictOutcome::Failed => bail!("{}", session.switch_status()),
    }
}

async fn services(config: &TomlConfig) -> Result<()> {
    let client = api_client(config)?;
    let current = client
        .current_service()
        .await
        .context("Failed to load services")?;

    let active = current.effective_service_type();
    println!("Active:    {}", service_display_name(active));
    println!("Loaded:    {}", current.service_loaded);
    println!("Available: {}", current.available_services.join(", "));
    match next_service_for(&current) {
        Some(next) => println!("Next:      {}", service_display_name(Some(next))),
        None => println!("Next:      - (nothing to switch to)"),
    }
    Ok(())
}

async fn health(config: &TomlConfig) -> Result<()> {
    let client = api_client(config)?;
    let health = client.health().await.context("Health check failed")?;
    println!("{}", serde_json::to_string_pretty(&health)?);
    Ok(())
}

async fn stats(config: &TomlConfig) -> Result<()> {
    let client = api_client(config)?;
    let stats = client.stats().await.context("Failed to load statistics")?;
    let retraining = client
        .retraining_status()
        .await
        .context("Failed to load retraining status")?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    println!("{}", serde_json::to_string_pretty(&retraining)?);
    Ok(())
}

async fn corrections(config: &TomlConfig, limit: u32) -> Result<()> {
    let client = api_client(config)?;
    let recent = client
        .recent_corrections(limit)
        .await
        .context("Failed to load corrections")?;
    println!("{}", serde_json::to_string_pretty(&recent)?);
    Ok(())
}

fn init_config(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = ConfigResolver::new(path)
        .config_path()
        .or_else(default_config_path)
        .context("No config directory available; pass --config")?;
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    TomlConfig::default()
        .write_to(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}
