use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use player_page_sync as lib;
use lib::config::{Config, DEFAULT_CONFIG_FILE};
use lib::cover::{CoverExtractor, CoverOutcome};
use lib::scanner::ScanError;
use lib::sync::{PlaylistSynchronizer, SyncOutcome};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::subscriber as tracing_subscriber_global;
use tracing::error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_log::LogTracer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "player-page-sync", version)]
struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Execution root holding the page, audios/ and backups/
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract embedded cover art next to each audio file
    ExtractCovers,
    /// Back up the page and rewrite its playlist from the audio folder
    UpdatePlaylist,
    /// Extract covers, then update the playlist
    All,
    /// Validate config and exit
    ConfigValidate,
    /// List page backups, oldest first
    Backups,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let cfg = match resolve_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            return ExitCode::from(2);
        }
    };

    // Keep the guard alive so the file writer flushes on exit.
    let _guard = match init_logging(&cfg) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Failed to initialize logging: {:#}", e);
            None
        }
    };

    match run(cli.command, &cfg) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            let chain = format!("{:#}", e);
            error!(error = %chain, "run failed");
            eprintln!("\nError: {}", chain);
            ExitCode::FAILURE
        }
    }
}

/// Explicit --config wins; otherwise use `<root>/player-page-sync.toml` when it
/// exists, else built-in defaults. --root always overrides the configured root.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let root = cli.root.clone().unwrap_or_else(|| PathBuf::from("."));
    let config_path = match &cli.config {
        Some(p) => Some(p.clone()),
        None => {
            let candidate = root.join(DEFAULT_CONFIG_FILE);
            if candidate.exists() { Some(candidate) } else { None }
        }
    };

    let mut cfg = match &config_path {
        Some(p) => {
            let mut cfg = Config::from_path(p)
                .with_context(|| format!("loading config from {}", p.display()))?;
            // A relative root in the file is relative to the file itself.
            if cfg.root.is_relative() {
                let base = p.parent().unwrap_or_else(|| Path::new("."));
                cfg.root = base.join(&cfg.root);
            }
            cfg
        }
        None => Config::for_root(&root),
    };
    if let Some(r) = &cli.root {
        cfg.root = r.clone();
    }
    cfg.validate()?;
    Ok(cfg)
}

fn init_logging(cfg: &Config) -> Result<Option<WorkerGuard>> {
    let _ = LogTracer::init();

    // Honor RUST_LOG if set, otherwise the configured level.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

    let (file_layer, guard) = match cfg.log_path() {
        Some(dir) => {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("creating log directory {}", dir.display()))?;
            let file_appender = tracing_appender::rolling::daily(&dir, "player-page-sync.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            (Some(fmt::layer().with_ansi(false).with_writer(non_blocking)), Some(guard))
        }
        None => (None, None),
    };
    let stderr_layer = fmt::layer().with_writer(std::io::stderr);

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer);

    tracing_subscriber_global::set_global_default(subscriber)
        .context("installing global tracing subscriber")?;
    Ok(guard)
}

/// Ok(false) means the requested operation could not do its work.
fn run(command: Commands, cfg: &Config) -> Result<bool> {
    match command {
        Commands::ExtractCovers => extract_covers(cfg),
        Commands::UpdatePlaylist => update_playlist(cfg),
        Commands::All => {
            // Directory-level conditions are reported but only I/O errors fail the run.
            extract_covers(cfg)?;
            println!();
            update_playlist(cfg)?;
            Ok(true)
        }
        Commands::ConfigValidate => {
            println!("OK");
            println!("  audio dir:  {}", cfg.audio_path().display());
            println!("  backup dir: {}", cfg.backup_path().display());
            println!("  page:       {}", cfg.markup_path().display());
            Ok(true)
        }
        Commands::Backups => {
            let backups = lib::backup::list_backups(&cfg.markup_path(), &cfg.backup_path())?;
            if backups.is_empty() {
                println!("No backups in {}", cfg.backup_path().display());
            }
            for b in backups {
                println!("{}", b.display());
            }
            Ok(true)
        }
    }
}

fn extract_covers(cfg: &Config) -> Result<bool> {
    println!("=== Cover extraction ===");
    let extractor = CoverExtractor::new(cfg);
    let report = extractor.run_with(|file, outcome| {
        let mark = match outcome {
            CoverOutcome::Extracted { .. } => "ok  ",
            _ => "fail",
        };
        println!("  [{}] {}: {}", mark, file.file_name(), outcome);
    });

    let report = match report {
        Ok(r) => r,
        Err(ScanError::MissingDirectory(dir)) => {
            println!("Audio directory does not exist: {}", dir.display());
            return Ok(false);
        }
        Err(e) => return Err(e).context("scanning audio directory"),
    };

    if report.is_empty() {
        println!("No audio files found in {}", cfg.audio_path().display());
        return Ok(false);
    }

    println!("\n=== Done ===");
    println!("Succeeded: {}", report.succeeded());
    println!("Failed:    {}", report.failed());
    Ok(true)
}

fn update_playlist(cfg: &Config) -> Result<bool> {
    println!("=== Playlist update ===");
    let report = PlaylistSynchronizer::new(cfg).sync()?;

    let backup_name = report
        .outcome
        .backup()
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    println!("Backup created: {}", backup_name);

    if !report.files.is_empty() {
        println!("Found {} audio file(s):", report.files.len());
        for f in &report.files {
            println!("  - {}", f.file_name());
        }
    }

    match report.outcome {
        SyncOutcome::Updated { count, .. } => {
            println!("{} updated with {} track(s).", cfg.markup_file.display(), count);
            println!("A previous version can be restored from {}", cfg.backup_path().display());
            Ok(true)
        }
        SyncOutcome::NoAudioFiles { .. } => {
            println!("No audio files found; nothing to update.");
            Ok(false)
        }
        SyncOutcome::MissingAudioDirectory { .. } => {
            println!("Audio directory does not exist: {}", cfg.audio_path().display());
            Ok(false)
        }
        SyncOutcome::PatternNotFound { .. } => {
            println!(
                "Could not find the `{}` array in {}; page left unchanged.",
                cfg.playlist_variable,
                cfg.markup_file.display()
            );
            Ok(false)
        }
    }
}
