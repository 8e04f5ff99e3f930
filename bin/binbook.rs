use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use jemallocator::Jemalloc;
use log::{error, info, warn, LevelFilter};
use simple_logger::SimpleLogger;
use tokio_util::sync::CancellationToken;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use binbook::worker::{FactoryReader, PriceOracle};
use binbook::{Engine, FixedPriceOracle, MemoryStore, OnChainOracle, PostgresStore, Replayer, Settings, Store};

#[tokio::main()]
async fn main() -> anyhow::Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .context("Failed to install logger")?;

    // Load configuration
    let settings = Settings::new()
        .context("Failed to load config.yaml. Please ensure it exists and is valid")?;

    match LevelFilter::from_str(&settings.log_level) {
        Ok(level) => log::set_max_level(level),
        Err(_) => warn!("Unknown log_level '{}', keeping info", settings.log_level),
    }

    let store: Arc<dyn Store> = match settings.postgres {
        Some(ref pg) => {
            let store = PostgresStore::connect(pg)
                .await
                .context("Failed to initialize database connection")?;
            store.migrate().await?;
            Arc::new(store)
        },
        None => {
            info!("No postgres settings, keeping state in memory");
            Arc::new(MemoryStore::new())
        },
    };

    let (prices, factory_reads): (Arc<dyn PriceOracle>, Arc<dyn FactoryReader>) =
        if settings.oracle.rpc_url.is_some() {
            let oracle = Arc::new(OnChainOracle::new(&settings.oracle)?);
            (oracle.clone() as Arc<dyn PriceOracle>, oracle as Arc<dyn FactoryReader>)
        } else {
            info!("No oracle.rpc_url, serving fixed prices");
            let oracle = Arc::new(FixedPriceOracle::from_settings(&settings.oracle)?);
            (oracle.clone() as Arc<dyn PriceOracle>, oracle as Arc<dyn FactoryReader>)
        };

    let engine = Engine::new(store, prices, factory_reads, &settings.engine)?;
    let mut replayer = Replayer::new(engine, settings.replay.halt_on_error);

    let events_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| settings.replay.events_path.clone());

    let cancellation_token = CancellationToken::new();
    let replay_token = cancellation_token.child_token();

    #[cfg(unix)]
    let mut sigterm_stream = {
        use tokio::signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?
    };

    info!("Replaying {}. Press Ctrl+C to stop.", events_path);

    let replay = replayer.replay_file(&events_path, replay_token);
    tokio::pin!(replay);

    #[cfg(unix)]
    let result = loop {
        tokio::select! {
            result = &mut replay => break result,
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), finishing current event...");
                cancellation_token.cancel();
            },
            _ = sigterm_stream.recv() => {
                info!("Received SIGTERM, finishing current event...");
                cancellation_token.cancel();
            },
        }
    };

    #[cfg(not(unix))]
    let result = loop {
        tokio::select! {
            result = &mut replay => break result,
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), finishing current event...");
                cancellation_token.cancel();
            },
        }
    };

    match result {
        Ok(stats) => {
            info!(
                "Replay finished: applied={} skipped={} already_applied={} failed={}",
                stats.applied, stats.skipped, stats.already_applied, stats.failed
            );
            Ok(())
        },
        Err(e) => {
            error!("Replay failed: {:#}", e);
            Err(e)
        },
    }
}
