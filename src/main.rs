use actix_server::ServerHandle;
use actix_web::{
    App, HttpServer,
    web::{self, Data},
};
use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};
use hydro_relay::{
    api::{Api, cors_headers},
    config::AppConfig,
    pico_client::PicoClient,
    services::hydraulics::ConfigurationStore,
};
use log::{debug, error, info};
use std::io::Write;
use tokio::signal::unix::{SignalKind, signal};

type RelayApi = Api<PicoClient>;

#[actix_web::main]
async fn main() {
    if let Err(e) = run().await {
        error!("application error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    initialize()?;

    let mut sigterm =
        signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;

    let (server_handle, server_task) = run_server()?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            debug!("ctrl-c received");
        },
        _ = sigterm.recv() => {
            debug!("SIGTERM received");
        },
        result = server_task => {
            match result {
                Ok(Ok(())) => debug!("server stopped normally"),
                Ok(Err(e)) => error!("server stopped with error: {e}"),
                Err(e) => error!("server task panicked: {e}"),
            }
        },
    }

    info!("shutting down");
    server_handle.stop(true).await;
    info!("shutdown complete");

    Ok(())
}

fn initialize() -> Result<()> {
    log_panics::init();

    let mut builder = if cfg!(debug_assertions) {
        Builder::from_env(Env::default().default_filter_or("debug"))
    } else {
        Builder::from_env(Env::default().default_filter_or("info"))
    };

    builder.format(|f, record| match record.level() {
        log::Level::Error => {
            eprintln!("{}", record.args());
            Ok(())
        }
        _ => {
            writeln!(f, "{}", record.args())
        }
    });

    builder.target(Target::Stdout).init();

    info!("module version: {}", env!("CARGO_PKG_VERSION"));

    // load and validate configuration from the environment
    let config = AppConfig::load().context("failed to load application configuration")?;
    debug!("configuration: {config:?}");

    Ok(())
}

fn run_server() -> Result<(
    ServerHandle,
    tokio::task::JoinHandle<Result<(), std::io::Error>>,
)> {
    let config = AppConfig::get();
    let peer_client =
        PicoClient::new(config.peer.clone()).context("failed to create peer client")?;
    info!("relaying tag status from {}", peer_client.url());

    let api = RelayApi::new(peer_client, ConfigurationStore::new());
    let bind_addr = (config.server.host.clone(), config.server.port);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(cors_headers())
            .app_data(Data::new(api.clone()))
            .route("/", web::get().to(RelayApi::index))
            .route("/api/nfc", web::get().to(RelayApi::nfc_status))
            .route("/config", web::get().to(RelayApi::config))
            .route("/version", web::get().to(RelayApi::version))
    })
    .bind(&bind_addr)
    .with_context(|| format!("failed to bind server to {}:{}", bind_addr.0, bind_addr.1))?
    .disable_signals()
    .run();

    info!("listening on {}:{}", bind_addr.0, bind_addr.1);

    Ok((server.handle(), tokio::spawn(server)))
}
