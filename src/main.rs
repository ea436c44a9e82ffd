mod app;
mod cache;
mod catalog;
mod commands;
mod config;
mod event;
mod prefs;
mod ui;
mod worker;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ortocat")]
#[command(about = "A terminal catalog browser for the Ortocentr store")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/ortocat/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Shop base URL, overriding the configured one
  #[arg(short, long)]
  url: Option<String>,

  /// Keep the cache in memory only; nothing touches disk
  #[arg(long)]
  no_cache: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Log to a file; stdout belongs to the TUI
  let _log_guard = init_logging();

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?;

  // Override shop URL if specified on command line
  let config = if let Some(url) = args.url {
    config::Config {
      catalog: config::CatalogConfig {
        url,
        ..config.catalog
      },
      ..config
    }
  } else {
    config
  };

  // Initialize and run the app
  let mut app = app::App::new(config, args.no_cache)?;
  app.run().await?;

  Ok(())
}

fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
  let log_dir = dirs::data_dir()?.join("ortocat").join("logs");
  let appender = tracing_appender::rolling::daily(log_dir, "ortocat.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(writer)
    .with_ansi(false)
    .init();

  Some(guard)
}
