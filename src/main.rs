//! Subtitler - video subtitle translation service
//!
//! Entry point for the HTTP server and the command line tools that run the
//! individual pipeline stages.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use subtitler::api::{create_router, AppState};
use subtitler::cli::{Args, Commands};
use subtitler::config::Config;
use subtitler::subtitle;
use subtitler::workflow::Workflow;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Keep the file writer alive until the program exits
    let _log_guard = setup_logging(args.verbose)?;

    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Serve { host, port, upload_dir } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(upload_dir) = upload_dir {
                config.server.upload_dir = upload_dir;
            }
            serve(config).await?;
        }
        Commands::Extract { input } => {
            let workflow = Workflow::new(config)?;
            let vtt_path = workflow.extract_subtitles(&input).await?;
            println!("{}", vtt_path.display());
        }
        Commands::Translate { input, target, source, output } => {
            let workflow = Workflow::new(config)?;
            let source = source.unwrap_or_else(|| workflow.config().translate.source_language.clone());
            let entries = subtitle::read_srt(&input).await?;

            let pb = ProgressBar::new(entries.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
                    .progress_chars("#>-"),
            );

            let cancel = CancellationToken::new();
            let ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    ctrl_c.cancel();
                }
            });

            let translated = workflow
                .translate_entries(&entries, &source, &target, &cancel, |done, _| {
                    pb.set_position(done as u64)
                })
                .await?;
            pb.finish_and_clear();

            let vtt_path = output.with_extension("vtt");
            subtitle::write_subtitle_pair(&translated, &output, &vtt_path).await?;
            info!("Wrote {} and {}", output.display(), vtt_path.display());
        }
        Commands::Mux { video, subtitles, output } => {
            let workflow = Workflow::new(config)?;
            workflow.mux(&video, &subtitles, &output).await?;
            info!("Wrote {}", output.display());
        }
    }

    Ok(())
}

async fn serve(config: Config) -> Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let workflow = Arc::new(Workflow::new(config)?);
    workflow.store().ensure_dir().await?;
    workflow.check_dependencies().await;

    let state = AppState::new(workflow.clone());
    let jobs = state.jobs.clone();
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(
        "Listening on http://{} (uploads in {})",
        addr,
        workflow.store().root().display()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down, cancelling running jobs");
            jobs.cancel_all().await;
        })
        .await?;

    Ok(())
}

fn setup_logging(verbose: bool) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_dir = std::env::current_dir()?.join(".subtitler").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Daily rotation
    let file_appender = rolling::daily(&log_dir, "subtitler.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(
        "Logging initialized - console: {}, file: {}",
        log_level,
        log_dir.join("subtitler.log").display()
    );

    Ok(guard)
}
