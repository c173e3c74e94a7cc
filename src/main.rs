use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::watch;
use tracing::{info, warn};

use seatwatch::config::{EmailConfig, WatchConfig};
use seatwatch::notifiers::{DesktopNotifier, EmailNotifier, Notifier};
use seatwatch::poller::Poller;
use seatwatch::session::{BrowserSession, VT_REG_URL};

#[derive(Parser, Debug)]
#[command(name = "seatwatch", about = "Watch VT course sections for open seats")]
struct Cli {
    /// Path to the watch list (CRNs, poll interval)
    #[arg(long, default_value = "watch_config.json")]
    watch_config: PathBuf,

    /// Path to the SMTP settings
    #[arg(long, default_value = "email_config.json")]
    email_config: PathBuf,

    /// Skip email alerts, desktop notifications only
    #[arg(long)]
    no_email: bool,

    /// Chrome/Chromium binary to launch (autodetected by default)
    #[arg(long)]
    chrome_path: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("seatwatch=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    // Config errors are fatal before any polling begins.
    let watch_config = WatchConfig::from_file(&cli.watch_config)?;

    let mut notifiers: Vec<Box<dyn Notifier>> = vec![Box::new(DesktopNotifier::new())];
    if cli.no_email {
        warn!("Email alerts disabled (--no-email)");
    } else {
        let email_config = EmailConfig::from_file(&cli.email_config)?;
        notifiers.push(Box::new(EmailNotifier::new(email_config)));
    }

    info!("Starting seat watcher for CRNs: {}", watch_config.crns.join(", "));

    let session = BrowserSession::launch(cli.chrome_path.clone())?;
    session.navigate(VT_REG_URL)?;

    // The watcher never logs in on its own: the user authenticates, picks
    // the term, and runs the course search before polling starts.
    println!("Log in, select your term, and run your course search in the browser window.");
    println!("Press Enter here when the results page is showing.");
    wait_for_enter().await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    let poller = Poller::new(session, watch_config, notifiers);
    poller.run(shutdown_rx).await?;

    info!("Shutting down");
    Ok(())
}

async fn wait_for_enter() -> Result<()> {
    tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        std::io::stdin().read_line(&mut line).map(|_| ())
    })
    .await??;
    Ok(())
}
