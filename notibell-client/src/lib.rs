use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub mod cli;
pub mod client;
pub mod config;
pub mod format;
pub mod host;
pub mod page;
pub mod poll;
pub mod view;

pub use cli::{Cli, Command};
pub use client::{ClientError, HttpNotificationClient, NotificationClient};
pub use config::{ClientConfig, load_config, resolve_config_path};
pub use page::{ElementIds, Interaction, MemoryPage, Page};
pub use poll::PollScheduler;
pub use view::ViewController;

use host::{ConsoleInteraction, LineSource};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Wires the widget to its page: the document-level pointer listener and the
/// unread-count poll. Safe to call more than once; returns whether anything
/// was started by this call.
pub async fn mount(view: &Arc<ViewController>, poll: &PollScheduler) -> bool {
    let listener = view.install_outside_listener().await;
    let polling = poll.start(Arc::clone(view)).await;
    listener || polling
}

/// Badge display after one fresh fetch, `"0"` while hidden. A failed fetch
/// is an error rather than a zero.
pub async fn unread_badge(view: &ViewController, page: &MemoryPage) -> Result<String, AppError> {
    if !view.refresh_badge().await {
        return Err(AppError::Unavailable("unread count could not be fetched".into()));
    }
    Ok(page
        .snapshot(view.ids())
        .badge
        .unwrap_or_else(|| "0".to_string()))
}

fn effective_config(
    config_path: Option<PathBuf>,
    server: Option<String>,
) -> Result<ClientConfig, AppError> {
    match (ClientConfig::find_and_load(config_path), server) {
        (Ok((path, mut cfg)), server) => {
            info!(path=?path, "loaded config");
            if let Some(s) = server {
                cfg.server_url = config::validate_server_url(&s)?;
            }
            Ok(cfg)
        }
        (Err(e), Some(s)) => {
            warn!(error=%e, "no usable config file; using --server with defaults");
            ClientConfig::for_server(&s)
        }
        (Err(e), None) => Err(e),
    }
}

pub async fn run(cli: Cli) -> Result<(), AppError> {
    init_tracing();

    let cfg = effective_config(cli.config, cli.server)?;
    let ids = cfg.elements.clone();
    info!(server = %cfg.server_url, "notification service selected");

    let client = Arc::new(HttpNotificationClient::new(
        cfg.server_url.clone(),
        cfg.session_cookie.clone(),
    ));
    let page = Arc::new(MemoryPage::with_widget_layout(&ids));
    let input = Arc::new(LineSource::stdin());
    let command = cli.command.unwrap_or(Command::Watch);
    let assume_yes = matches!(command, Command::Delete { yes: true, .. });
    let interaction =
        Arc::new(ConsoleInteraction::new(Arc::clone(&input)).assume_yes(assume_yes));
    let view = Arc::new(
        ViewController::new(client, page.clone(), interaction, ids.clone())
            .with_stale_guard(cfg.discard_stale_responses),
    );

    match command {
        Command::Watch => {
            let poll = PollScheduler::global(cfg.poll_interval());
            mount(&view, poll).await;

            let cancel = CancellationToken::new();
            let signal_cancel = cancel.clone();
            tokio::spawn(async move {
                shutdown_signal().await;
                info!("shutdown signal received; stopping");
                signal_cancel.cancel();
            });

            let res = host::run_console(Arc::clone(&view), page, input, cancel).await;
            poll.shutdown().await;
            view.shutdown().await;
            res
        }
        Command::Count => {
            println!("{}", unread_badge(&view, &page).await?);
            Ok(())
        }
        Command::List => {
            view.toggle_dropdown().await;
            print!("{}", page.snapshot(&ids));
            Ok(())
        }
        Command::ReadAll => {
            view.handle_mark_all_read().await;
            print!("{}", page.snapshot(&ids));
            Ok(())
        }
        Command::Delete { id, .. } => {
            view.handle_delete(&id.as_str().into()).await;
            print!("{}", page.snapshot(&ids));
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let (mut sigint, mut sigterm) = match (
            signal(SignalKind::interrupt()),
            signal(SignalKind::terminate()),
        ) {
            (Ok(i), Ok(t)) => (i, t),
            (Err(e), _) | (_, Err(e)) => {
                warn!(error=%e, "signal handlers unavailable");
                return std::future::pending().await;
            }
        };
        tokio::select! {
            _ = sigint.recv() => {
                info!("shutdown: received SIGINT");
            }
            _ = sigterm.recv() => {
                info!("shutdown: received SIGTERM");
            }
        }
    }
    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error=%e, "ctrl_c handler unavailable");
            return std::future::pending().await;
        }
        info!("shutdown: received ctrl_c");
    }
}
