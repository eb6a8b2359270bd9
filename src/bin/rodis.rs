use std::path::PathBuf;

use clap::Parser;
use tokio::signal::unix::{signal, SignalKind};
use tracing::Level;

use rodis::config::Config;
use rodis::{server, Error};

#[derive(Parser, Debug)]
#[command(name = "rodis", about = "Redis-wire-compatible server")]
struct Args {
    /// Path to the config file
    #[arg(short = 'c', default_value = "./rodis.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();
    let config = Config::load(&args.config)?;

    let level = config.log_level.parse::<Level>().unwrap_or(Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;
    let mut sigquit = signal(SignalKind::quit())?;

    let terminate = async move {
        tokio::select! {
            _ = sigint.recv() => {}
            _ = sigterm.recv() => {}
            _ = sighup.recv() => {}
            _ = sigquit.recv() => {}
        }
    };

    server::run(config, terminate).await
}
