use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use workspace_dash::api::{self, middleware::AuthConfig, AppState};
use workspace_dash::config::DashboardConfig;
use workspace_dash::models::PersistedSnapshot;
use workspace_dash::sessions::SessionClient;
use workspace_dash::snapshot::{self, SnapshotStore};

#[derive(Parser)]
#[command(name = "wsdash")]
#[command(about = "Password-gated dashboard for a local agent workspace")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the dashboard API server
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Address to bind
        #[arg(short, long, default_value = "127.0.0.1")]
        bind: String,

        /// Workspace root (overrides WORKSPACE_PATH)
        #[arg(short, long)]
        workspace: Option<PathBuf>,

        /// Persisted snapshot file (overrides DASHBOARD_SNAPSHOT_PATH)
        #[arg(short, long)]
        snapshot: Option<PathBuf>,
    },
    /// Scan the workspace and write the persisted snapshot
    Generate {
        /// Workspace root (overrides WORKSPACE_PATH)
        #[arg(short, long)]
        workspace: Option<PathBuf>,

        /// Output file (overrides DASHBOARD_SNAPSHOT_PATH)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a live workspace snapshot as JSON
    Scan {
        /// Workspace root (overrides WORKSPACE_PATH)
        #[arg(short, long)]
        workspace: Option<PathBuf>,
    },
}

/// Initialize tracing with output to stderr (for scan) or stdout
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "workspace_dash=debug,tower_http=debug".into()),
    );

    if use_stderr {
        // stdout carries the JSON
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let use_stderr = matches!(cli.command, Some(Commands::Scan { .. }));
    init_tracing(use_stderr);

    match cli.command {
        Some(Commands::Serve {
            port,
            bind,
            workspace,
            snapshot,
        }) => serve(&bind, port, workspace, snapshot).await?,
        Some(Commands::Generate { workspace, output }) => generate(workspace, output).await?,
        Some(Commands::Scan { workspace }) => {
            let config = DashboardConfig::from_env().with_workspace_root(workspace.as_deref());
            let snapshot = snapshot::build(&config.workspace_root, &config.rules)?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        None => serve("127.0.0.1", 3000, None, None).await?,
    }

    Ok(())
}

async fn serve(
    bind: &str,
    port: u16,
    workspace: Option<PathBuf>,
    snapshot: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = DashboardConfig::from_env()
        .with_workspace_root(workspace.as_deref())
        .with_snapshot_path(snapshot.as_deref());
    let auth = AuthConfig::from_env();

    tracing::info!("Workspace root: {}", config.workspace_root.display());
    tracing::info!("Persisted snapshot: {}", config.snapshot_path.display());
    if !auth.is_enabled() {
        tracing::warn!("DASHBOARD_PASSWORD is not set; the dashboard is open to anyone");
    }

    let app = api::create_router(AppState::new(config, auth)?);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", bind, port)).await?;
    tracing::info!("Dashboard listening on http://{}:{}", bind, port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

/// Out-of-band producer for the persisted snapshot.
async fn generate(workspace: Option<PathBuf>, output: Option<PathBuf>) -> anyhow::Result<()> {
    let config = DashboardConfig::from_env()
        .with_workspace_root(workspace.as_deref())
        .with_snapshot_path(output.as_deref());

    let root = config.workspace_root.clone();
    let rules = config.rules.clone();
    let snapshot = tokio::task::spawn_blocking(move || snapshot::build(&root, &rules)).await??;

    // A missing session service only means an empty session list on disk.
    let (sessions, note) = SessionClient::new(&config.sessions)?
        .fetch_sessions()
        .await
        .into_parts();
    if let Some(note) = note {
        tracing::warn!("{}", note);
    }

    let project_count = snapshot.projects().count();
    let config_count = snapshot.configs().count();
    let session_count = sessions.len();
    let store = SnapshotStore::new(&config.snapshot_path);
    store.save(&PersistedSnapshot::new(snapshot, sessions)).await?;

    println!(
        "Generated {} with {} projects, {} config files and {} sessions",
        store.path().display(),
        project_count,
        config_count,
        session_count
    );
    Ok(())
}
