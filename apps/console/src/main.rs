use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Args, Parser, Subcommand};
use console_core::{
    viewer::ViewerBinding, ControlSession, Dashboard, DashboardView, HttpDeviceServer,
    MessageRouter, NotificationBoard, Notices, Notifier, SessionEvent,
};
use shared::{
    domain::DeviceSelection,
    protocol::{ControlFrame, InboundMessage},
};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::load_settings;

#[derive(Parser, Debug)]
#[command(about = "Control a device server and its remote dashboard channel")]
struct Cli {
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    control_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll the device server and print the dashboard.
    Status,
    /// Start the device server with the given drivers.
    Start(SelectionArgs),
    Stop,
    /// Start or stop depending on the polled state.
    Toggle(SelectionArgs),
    /// Open the control channel and print routed messages until Ctrl-C.
    Monitor {
        /// Extra `{"event": .., "params": {..}}` frame sent after the handshake.
        #[arg(long = "send")]
        frames: Vec<String>,
    },
}

#[derive(Args, Debug)]
struct SelectionArgs {
    #[arg(long)]
    camera: Option<String>,
    #[arg(long)]
    telescope: Option<String>,
    #[arg(long)]
    focuser: Option<String>,
    #[arg(long)]
    filterwheel: Option<String>,
    #[arg(long)]
    solver: Option<String>,
    #[arg(long)]
    guider: Option<String>,
    #[arg(long)]
    plugins: Option<String>,
}

impl SelectionArgs {
    fn apply_to(self, selection: &mut DeviceSelection) {
        let overrides = [
            ("camera", self.camera),
            ("telescope", self.telescope),
            ("focuser", self.focuser),
            ("filterwheel", self.filterwheel),
            ("solver", self.solver),
            ("guider", self.guider),
            ("plugins", self.plugins),
        ];
        for (key, value) in overrides {
            if let Some(value) = value {
                selection.apply(key, value);
            }
        }
    }
}

/// Prints every routed message as one JSON line and mirrors its event name
/// to the general log line.
struct PrintingRouter {
    notifier: Arc<dyn Notifier>,
}

#[async_trait]
impl MessageRouter for PrintingRouter {
    async fn route(&self, message: InboundMessage) {
        let event = message.event().unwrap_or("<none>");
        info!(event, "control: message");
        self.notifier.log_text(&format!("last event: {event}"));
        match serde_json::to_string(&message.body) {
            Ok(text) => println!("{text}"),
            Err(err) => warn!("failed to print message: {err}"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref());
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url;
    }
    if let Some(control_url) = cli.control_url {
        settings.control_url = control_url;
    }

    let board = NotificationBoard::new();
    let notifier: Arc<dyn Notifier> = Arc::new(board.clone());
    let session = ControlSession::new(
        &settings.control_url,
        Arc::new(PrintingRouter {
            notifier: Arc::clone(&notifier),
        }),
        Arc::clone(&notifier),
    )?;
    let dashboard = Dashboard::new(
        Arc::new(HttpDeviceServer::new(settings.server_url.as_str())),
        notifier,
        session,
    );
    let mut selection = settings.devices.clone();

    match cli.command {
        Command::Status => {
            dashboard.on_ready().await;
            let viewer = ViewerBinding::gallery();
            println!(
                "{:>16}: {} ({}, {})",
                "viewer",
                viewer.selector(),
                viewer.options().mode(),
                viewer.options().url_attribute
            );
        }
        Command::Start(args) => {
            args.apply_to(&mut selection);
            dashboard.set_selection(selection).await;
            dashboard.start_devices().await;
        }
        Command::Stop => dashboard.stop_devices().await,
        Command::Toggle(args) => {
            args.apply_to(&mut selection);
            dashboard.set_selection(selection).await;
            dashboard.on_ready().await;
            dashboard.toggle_server().await;
        }
        Command::Monitor { frames } => monitor(&dashboard, &frames).await?,
    }

    print_dashboard(&dashboard.view().await, &board.snapshot());
    Ok(())
}

async fn monitor(dashboard: &Dashboard, raw_frames: &[String]) -> Result<()> {
    let frames = raw_frames
        .iter()
        .map(|raw| {
            serde_json::from_str::<ControlFrame>(raw)
                .with_context(|| format!("invalid --send frame: {raw}"))
        })
        .collect::<Result<Vec<_>>>()?;

    dashboard.on_ready().await;
    let session = dashboard.session();
    let mut events = session.subscribe_events();
    if !dashboard.toggle_client().await {
        warn!("device server is not running; control channel stays disabled");
        return Ok(());
    }

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(SessionEvent::Opened) => {
                    for frame in &frames {
                        session.send_frame(frame).await?;
                    }
                }
                Ok(SessionEvent::Error(reason)) => warn!(reason, "control channel error"),
                Ok(SessionEvent::Closed) | Err(RecvError::Closed) => break,
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "session events lagged"),
            },
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for ctrl-c")?;
                session.disconnect().await;
            }
        }
    }
    Ok(())
}

fn print_dashboard(view: &DashboardView, notices: &Notices) {
    for (id, text) in view.fields() {
        println!("{id:>16}: {text}");
    }
    println!(
        "{:>16}: {}",
        "client_enabled",
        if view.client_enabled { "yes" } else { "no" }
    );
    if notices.error_visible {
        println!("{:>16}: {}", "error", notices.error_text);
    }
    if !notices.log_line.is_empty() {
        println!("{:>16}: {}", "log", notices.log_line);
    }
}
