//! Paste server entrypoint.

use ttlpaste_core::config::format_lifetime;
use ttlpaste_server::{serve_router, AppState, Config, PasteStore, StoreConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct CliFlags {
    help: bool,
}

fn parse_cli_flags(args: &[String]) -> anyhow::Result<CliFlags> {
    let mut flags = CliFlags::default();
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => flags.help = true,
            value if value.starts_with('-') => {
                anyhow::bail!(
                    "Unknown option: '{}'. Use --help to see supported options.",
                    value
                );
            }
            value => {
                anyhow::bail!(
                    "Unexpected positional argument: '{}'. Use --help to see supported options.",
                    value
                );
            }
        }
    }
    Ok(flags)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ttlpaste=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    if parse_cli_flags(&args)?.help {
        print_help();
        return Ok(());
    }

    let config = Config::from_env()?;
    tracing::info!("dataDir     = {}", config.data_dir.display());
    tracing::info!("maxStorage  = {}", config.max_storage);
    tracing::info!("maxPaste    = {}", config.max_paste_size);
    tracing::info!("lifeTime    = {}", format_lifetime(config.lifetime));
    tracing::info!("siteUrl     = {}", config.site_url);
    tracing::info!("listen      = {}", config.listen);

    let store = PasteStore::open(StoreConfig::from(&config)).await?;
    tracing::info!("{}", store.report().await);

    let listener = tokio::net::TcpListener::bind(config.listen.as_str()).await?;
    match listener.local_addr() {
        Ok(addr) => tracing::info!("ttlpaste running at http://{}", addr),
        Err(_) => tracing::info!("ttlpaste running at http://{}", config.listen),
    }

    let state = AppState::new(config, store);
    serve_router(listener, state, shutdown_signal()).await?;
    tracing::info!("Server stopped");

    Ok(())
}

fn print_help() {
    println!("ttlpaste - self-hosted paste server with expiring pastes\n");
    println!("Usage: ttlpaste [OPTIONS]\n");
    println!("Options:");
    println!("  --help            Show this help message");
    println!("\nEnvironment variables:");
    println!("  DATA_DIR          Directory to store all the pastes in (default: data)");
    println!("  MAX_STORAGE       Maximum total size of stored pastes (default: 500MB)");
    println!("  MAX_PASTE_SIZE    Maximum size of a single upload (default: 1MB)");
    println!("  LIFETIME          Lifetime of the pastes, units s,m,h,d; 0 disables expiry (default: 12h)");
    println!("  SITE_URL          Public URL of the site (default: http://localhost:8080)");
    println!("  LISTEN            Address to listen on (default: 127.0.0.1:8080)");
    println!("  RUST_LOG          Log filter (default: ttlpaste=info,tower_http=warn)");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_cli_flags, CliFlags};

    #[test]
    fn parse_cli_flags_rejects_unknown_and_positional_arguments() {
        let cases = [
            (
                vec!["ttlpaste".to_string(), "--data-dir".to_string()],
                "Unknown option",
            ),
            (
                vec!["ttlpaste".to_string(), "serve".to_string()],
                "Unexpected positional argument",
            ),
        ];

        for (args, expected_fragment) in cases {
            let err = parse_cli_flags(&args).expect_err("invalid args should be rejected");
            assert!(err.to_string().contains(expected_fragment));
        }
    }

    #[test]
    fn parse_cli_flags_accepts_help() {
        let args = vec!["ttlpaste".to_string(), "--help".to_string()];
        assert_eq!(
            parse_cli_flags(&args).expect("help should parse"),
            CliFlags { help: true }
        );
        assert_eq!(
            parse_cli_flags(&["ttlpaste".to_string()]).expect("no args"),
            CliFlags::default()
        );
    }
}
