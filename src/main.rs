use std::sync::Arc;

use courier::config::Config;
use courier::handlers;
use courier::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let mut cfg = match std::env::var("COURIER_CONFIG") {
        Ok(path) => Config::from_file(path)?,
        Err(_) => Config::load(),
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--directory" {
            match args.next() {
                Some(dir) => cfg.directory = dir.into(),
                None => anyhow::bail!("--directory requires a path"),
            }
        }
    }

    tracing::info!(directory = %cfg.directory.display(), "Serving files");
    let router = Arc::new(handlers::routes(&cfg.directory, cfg.prefix_matching));

    tokio::select! {
        res = server::listener::run(&cfg, router) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
