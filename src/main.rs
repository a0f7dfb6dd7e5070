use {
    closure_sync::{
        AppState,
        adapters::{http::router, lightspeed_client::LightspeedClient},
        config::Config,
        domain::provider::RetailProvider,
        services::closure_aggregator::ClosureAggregator,
    },
    std::{process, sync::Arc, time::Duration},
    tokio::signal,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    dotenvy::dotenv().ok();
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            process::exit(1);
        }
    };

    let client = match LightspeedClient::new(config.upstream.clone()) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "failed to build vendor client");
            process::exit(1);
        }
    };
    let provider: Arc<dyn RetailProvider> = Arc::new(client);

    let state = AppState {
        aggregator: Arc::new(ClosureAggregator::new(
            provider.clone(),
            config.aggregation.clone(),
        )),
        provider,
    };

    // Leave the aggregator room to return a truncated batch before the
    // HTTP layer gives up.
    let request_timeout = config.aggregation.deadline + Duration::from_secs(5);
    let app = router(state, request_timeout);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "failed to bind");
            process::exit(1);
        }
    };
    tracing::info!(
        %addr,
        upstream = %config.upstream.base_url,
        token_configured = !config.upstream.api_token.is_empty(),
        "listening"
    );

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server error");
        process::exit(1);
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to listen for ctrl+c");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to listen for SIGTERM")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl+c, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
