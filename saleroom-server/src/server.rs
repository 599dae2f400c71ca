use {
    crate::{
        api,
        api::ws::WsState,
        auction::service::Service,
        config::RunOptions,
        kernel::db::DB,
        room::Registry,
        state::Store,
    },
    anyhow::anyhow,
    sqlx::postgres::PgPoolOptions,
    std::{
        sync::{
            atomic::{
                AtomicBool,
                Ordering,
            },
            Arc,
        },
        time::Duration,
    },
    tokio_util::task::TaskTracker,
};

const NOTIFICATIONS_CHAN_LEN: usize = 1000;

pub async fn start_server(run_options: RunOptions) -> anyhow::Result<()> {
    tokio::spawn(async move {
        tracing::info!("Registered shutdown signal handler...");
        tokio::signal::ctrl_c().await.unwrap();
        tracing::info!("Shut down signal received, waiting for tasks...");
        SHOULD_EXIT.store(true, Ordering::Release);
    });

    let db: DB = PgPoolOptions::new()
        .max_connections(10)
        .connect(&run_options.server.database_url)
        .await
        .map_err(|err| anyhow!("Failed to connect to database: {:?}", err))?;

    let ws = WsState::new(NOTIFICATIONS_CHAN_LEN);
    let task_tracker = TaskTracker::new();
    let store = Arc::new(Store {
        auction_service: Service::new(db, task_tracker.clone(), ws.broadcast_sender.clone()),
        room_registry:   Registry::new(ws.broadcast_sender.clone()),
        ws,
        task_tracker,
    });

    api::start_api(run_options, store.clone()).await?;

    // Let the fire-and-forget storage writes drain before exiting.
    store.task_tracker.close();
    store.task_tracker.wait().await;
    Ok(())
}

// A static exit flag to indicate to running threads that we're shutting down.
// This is used to gracefully shutdown the application.
pub(crate) static SHOULD_EXIT: AtomicBool = AtomicBool::new(false);
pub const EXIT_CHECK_INTERVAL: Duration = Duration::from_secs(1);
