use std::sync::Arc;

use anyhow::Result;
use rand::{rngs::StdRng, SeedableRng};
use tokio::{net::TcpListener, signal};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use irrigation_telemetry::{
    api::{self, AppState},
    config::Config,
    db,
    leituras::LeituraService,
    simulator::Simulator,
    store::{LeituraStore, MemoryStore, PgStore, ReadingStore},
    telemetry::IngestionService,
    weather::WeatherClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; the environment may already be set
    let _ = dotenvy::dotenv();

    // Initialise tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    // Load config
    let config = Config::from_env()?;

    // Pick the storage backend
    let (readings, leituras): (Arc<dyn ReadingStore>, Arc<dyn LeituraStore>) =
        match &config.database_url {
            Some(url) => {
                let pool = db::connect(url).await?;
                info!("Database ready");
                let store = PgStore::new(pool);
                let readings: Arc<dyn ReadingStore> = Arc::new(store.clone());
                let leituras: Arc<dyn LeituraStore> = Arc::new(store);
                (readings, leituras)
            }
            None => {
                warn!("DATABASE_URL not set; readings are kept in memory and lost on exit");
                let store = MemoryStore::new();
                let readings: Arc<dyn ReadingStore> = Arc::new(store.clone());
                let leituras: Arc<dyn LeituraStore> = Arc::new(store);
                (readings, leituras)
            }
        };

    let telemetry = Arc::new(IngestionService::new(readings, config.drought_threshold));
    if config.hg_api_key.is_none() {
        warn!("HG_API_KEY not set; /api/clima will answer 500");
    }

    let state = AppState {
        telemetry: telemetry.clone(),
        leituras: Arc::new(LeituraService::new(leituras)),
        weather: WeatherClient::new(&config),
    };

    // Spawn simulator task
    let shutdown = CancellationToken::new();
    let simulator = if config.simulator_enabled {
        let sim = Simulator::new(
            telemetry,
            config.simulator_device_ids.clone(),
            config.simulator_interval,
            StdRng::from_entropy(),
        );
        Some(tokio::spawn(sim.run(shutdown.clone())))
    } else {
        info!("Simulator disabled");
        None
    };

    // Start HTTP server
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown.cancel();
    if let Some(handle) = simulator {
        handle.await?;
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
