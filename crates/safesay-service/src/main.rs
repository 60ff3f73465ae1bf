use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use parking_lot::Mutex;
use safesay_core::clipboard::ClipboardService;
use safesay_core::notify::{Notifier, NullNotifier};
use safesay_core::paths::state_file_path;
use safesay_core::storage::{load_key_history, load_settings};
use safesay_core::store::{FileStore, StateStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;

use safesay_service::background::{spawn_background_task, BackgroundTask};
use safesay_service::capability::Capability;
use safesay_service::clipboard_sys::SystemClipboard;
use safesay_service::detect::DetectionPipeline;
use safesay_service::dispatch::{LogNotifier, NotificationDispatcher};
use safesay_service::lifecycle::AppLifecycle;
use safesay_service::monitor::spawn_monitor;
use safesay_service::service_state::ServiceState;

#[derive(Parser, Debug)]
#[command(author, version, about = "SafeSay clipboard auto-decrypt service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the clipboard monitor
    Run {
        /// State file override
        #[arg(long)]
        state_file: Option<PathBuf>,
        /// Active key for this session; defaults to the most recent history
        /// entry, then to the configured default
        #[arg(long)]
        key: Option<String>,
        /// Clipboard-only capability: no notifications, no background task
        #[arg(long)]
        clipboard_only: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            state_file,
            key,
            clipboard_only,
        } => run_command(state_file, key, clipboard_only).await,
    }
}

async fn run_command(
    state_file: Option<PathBuf>,
    key_override: Option<String>,
    clipboard_only: bool,
) -> Result<()> {
    let state_path = match state_file {
        Some(path) => path,
        None => state_file_path()?,
    };
    let store: Arc<dyn StateStore> = Arc::new(FileStore::load_or_create(&state_path)?);

    let settings = load_settings(store.as_ref())?;
    settings.validate()?;

    let capability = if clipboard_only {
        Capability::ClipboardOnly
    } else {
        Capability::Full
    };

    let history = load_key_history(store.as_ref());
    let active_key = key_override
        .or_else(|| history.most_recent().map(str::to_string))
        .unwrap_or_else(|| settings.default_key.clone());

    let mut service_state = ServiceState::new(store.clone(), history);
    service_state.set_active_key(&active_key);
    let state = Arc::new(Mutex::new(service_state));

    let clipboard: Arc<dyn ClipboardService> =
        Arc::new(SystemClipboard::new().map_err(|e| anyhow!("open clipboard: {e}"))?);
    let notifier: Arc<dyn Notifier> = if capability.notifications() {
        Arc::new(LogNotifier)
    } else {
        Arc::new(NullNotifier)
    };
    let dispatcher = NotificationDispatcher::new(notifier, settings.notification_preview_limit);

    let pipeline = Arc::new(DetectionPipeline::new(
        clipboard,
        store.clone(),
        dispatcher,
        state.clone(),
    ));

    let lifecycle = Arc::new(AppLifecycle::new());
    let (monitor_task, monitor_handle) = spawn_monitor(
        pipeline.clone(),
        state.clone(),
        Duration::from_secs(settings.poll_interval_secs),
        lifecycle.subscribe(),
    );

    let background = if capability.background() {
        let task = Arc::new(BackgroundTask::new(
            pipeline.clone(),
            store.clone(),
            settings.default_key.clone(),
        ));
        Some(spawn_background_task(
            task,
            Duration::from_secs(settings.background_interval_secs),
        ))
    } else {
        info!("clipboard-only capability, background task not registered");
        None
    };

    #[cfg(unix)]
    let activation_task = spawn_activation_signal(lifecycle.clone())?;

    info!(
        capability = ?capability,
        state_file = %state_path.display(),
        "service started"
    );
    signal::ctrl_c().await?;
    info!("service stopping");

    // deterministic teardown: both loops observe shutdown and return
    let _ = monitor_handle.shutdown_tx.send(true);
    let _ = monitor_task.await;
    if let Some((task, handle)) = background {
        let _ = handle.shutdown_tx.send(true);
        let _ = task.await;
    }
    #[cfg(unix)]
    activation_task.abort();
    Ok(())
}

/// Forward SIGUSR1 to the lifecycle channel as an activation event, so an
/// external trigger can force an immediate clipboard check.
#[cfg(unix)]
fn spawn_activation_signal(lifecycle: Arc<AppLifecycle>) -> Result<tokio::task::JoinHandle<()>> {
    use safesay_service::lifecycle::AppState;
    use tokio::signal::unix::{signal as unix_signal, SignalKind};

    let mut stream = unix_signal(SignalKind::user_defined1())?;
    Ok(tokio::spawn(async move {
        while stream.recv().await.is_some() {
            info!("activation signal received");
            lifecycle.signal(AppState::Active);
        }
    }))
}
