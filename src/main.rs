use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use doc_assistant::{api, assistant, extract, AppConfig, DocumentService};

#[derive(Parser)]
#[command(name = "doc-assistant")]
#[command(about = "Summaries, grounded answers and reasoning challenges for your documents")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port for HTTP API
        #[arg(short, long, default_value = "8000")]
        port: u16,
    },
    /// Print the summary of a local .txt or .pdf file
    Summarize {
        /// File to summarize
        path: PathBuf,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "doc_assistant=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn serve(config: AppConfig, host: &str, port: u16) -> anyhow::Result<()> {
    let service = DocumentService::from_config(config);
    let app = api::create_router(service);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Could not bind {}", addr))?;
    tracing::info!("Document assistant listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn summarize(config: AppConfig, path: PathBuf) -> anyhow::Result<()> {
    let filename = path.to_string_lossy();
    let kind = extract::FileKind::from_filename(&filename)?;
    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("Could not read {}", path.display()))?;
    let text = extract::extract_text(&bytes, kind)?;

    let summary = assistant::from_config(&config)
        .summarize(&text, config.summary_words)
        .await;
    println!("{}", summary);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = AppConfig::from_env();

    match cli.command {
        Some(Commands::Serve { host, port }) => serve(config, &host, port).await,
        Some(Commands::Summarize { path }) => summarize(config, path).await,
        None => serve(config, "127.0.0.1", 8000).await,
    }
}
