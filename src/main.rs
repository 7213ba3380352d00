use ant_arena::client::BackendClient;
use ant_arena::config::Config;
use ant_arena::loader::{Containers, DataLoader, ScheduleRefresh};
use ant_arena::{router, AppState};
use std::{net::SocketAddr, sync::Arc};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::load().await;
    let client = BackendClient::new(config.backend_url.clone(), config.request_timeout)?;
    let loader = Arc::new(DataLoader::new(client.clone(), Arc::new(Containers::new())));

    loader.spawn_all();
    let mut refresh = ScheduleRefresh::default();
    refresh.start(Arc::clone(&loader));

    let state = AppState::new(loader, client, config.preferences_path.clone());
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    refresh.stop();
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {err}");
        std::future::pending::<()>().await;
    }
}
