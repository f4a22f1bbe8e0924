use std::path::PathBuf;
use std::sync::Arc;

use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use clap::{Parser, Subcommand};

use helix_quickstart::client::{connect, DirectTransport};
use helix_quickstart::config::{Config, TransportKind};
use helix_quickstart::core::db::seed_on_startup;
use helix_quickstart::handlers::{configure, AppState};
use helix_quickstart::{logging, walkthrough};

#[derive(Parser)]
#[command(name = "quickstart")]
#[command(about = "HelixDB social graph quickstart", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// How the client reaches HelixDB
    #[arg(short, long, value_enum)]
    transport: Option<TransportKind>,

    #[arg(long, value_name = "URL")]
    helix_url: Option<String>,

    #[arg(long, value_name = "URL")]
    gateway_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the web UI and the gateway API
    Serve {
        #[arg(short, long, value_name = "ADDR")]
        bind: Option<String>,

        /// Create the sample users, follows and posts before serving
        #[arg(long)]
        seed: bool,
    },
    /// Seed sample data and print every query's result
    Walkthrough,
}

impl Cli {
    fn config(&self) -> anyhow::Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        if let Some(transport) = self.transport {
            config.transport = transport;
        }
        if let Some(url) = &self.helix_url {
            config.helix_url = url.clone();
        }
        if let Some(url) = &self.gateway_url {
            config.gateway_url = url.clone();
        }
        if let Command::Serve { bind, seed } = &self.command {
            if let Some(bind) = bind {
                config.bind = bind.clone();
            }
            config.seed_on_start |= *seed;
        }
        Ok(config)
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let state = web::Data::new(AppState {
        client: connect(&config),
        upstream: Arc::new(DirectTransport::new(&config.helix_url)),
        config: config.clone(),
    });

    if config.seed_on_start {
        seed_on_startup(&config.helix_url).await;
    }

    tracing::info!(
        bind = %config.bind,
        transport = state.client.transport_name(),
        helix_url = %config.helix_url,
        "server listening"
    );

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind(&config.bind)
    .with_context(|| format!("binding {}", config.bind))?
    .run()
    .await
    .context("server error")
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.config()?;
    logging::init(&config.log_level)?;

    match cli.command {
        Command::Serve { .. } => serve(config).await,
        Command::Walkthrough => {
            let client = connect(&config);
            let mut stdout = std::io::stdout();
            walkthrough::run_walkthrough(client.as_ref(), &mut stdout).await?;
            Ok(())
        }
    }
}
