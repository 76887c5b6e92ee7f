use trousseau::config::Config;
use trousseau::server;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trousseau=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let (host, port) = (config.host.clone(), config.port);
    tracing::info!(version = trousseau::VERSION, "Starting Trousseau on {}", config.address());

    let (_state, app) = match server::build_app(config) {
        Ok(built) => built,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialise application");
            std::process::exit(1);
        }
    };

    match server::serve(app, &host, port).await {
        Ok((actual_port, handle)) => {
            tracing::info!("Listening on http://{}:{}", host, actual_port);
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Server task failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to bind address");
            std::process::exit(1);
        }
    }
}
