use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scribeflow::audio::AudioFile;
use scribeflow::lifecycle::SessionSupervisor;
use scribeflow::llm::HttpLlmService;
use scribeflow::realtime::{RealtimeStream, StreamConfig};
use scribeflow::session::SessionStore;
use scribeflow::settings::{self, ExportOptions};
use scribeflow::storage::{JsonFileStore, KeyValueStore};
use scribeflow::usage::UsageLedger;
use scribeflow::{create_router, AppState, Config};
use tokio::sync::mpsc;
use tracing::info;

#[derive(Parser)]
#[command(name = "scribeflow", about = "Transcription workflow session core")]
struct Cli {
    /// Config file (without extension)
    #[arg(long, default_value = "config/scribeflow")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP control/observation server
    Serve,
    /// Stream a WAV file through the realtime transcription pipeline
    Stream {
        file: String,
        #[arg(long)]
        session_id: Option<String>,
    },
    /// Print a portable settings token
    ExportConfig {
        #[arg(long)]
        include_api_keys: bool,
        #[arg(long)]
        include_session_data: bool,
    },
    /// Print a credential-only settings token
    ExportApiKeys,
    /// Validate a settings token and write it into storage
    ImportConfig { token: String },
    /// Print the token usage history
    Usage,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));

    let store = Arc::new(JsonFileStore::open(&cfg.storage.path));

    match cli.command {
        Command::Serve => {
            let llm = Arc::new(HttpLlmService::new(&cfg.llm.base_url));
            let state = AppState::new(store, llm);
            let router = create_router(state);

            let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
            info!("HTTP server listening on {}", addr);

            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            axum::serve(listener, router)
                .await
                .context("HTTP server failed")?;
        }

        Command::Stream { file, session_id } => {
            let audio = AudioFile::open(&file)?;
            let samples = audio.resample_to_mono_16khz()?;

            let mut stream_config = StreamConfig {
                transport_url: cfg.transport.url.clone(),
                // Blocks below are already normalized to the target rate
                native_sample_rate: 16_000,
                frame_channel_capacity: cfg.audio.frame_channel_capacity,
                archive_dir: cfg.audio.archive_path.as_ref().map(Into::into),
                ..StreamConfig::default()
            };
            if let Some(id) = session_id {
                stream_config.session_id = id;
            }

            let supervisor = Arc::new(SessionSupervisor::new());
            let sessions = SessionStore::new(store as Arc<dyn KeyValueStore>);
            let stream =
                RealtimeStream::new(stream_config, Arc::clone(&supervisor), sessions).await?;

            let (tx, rx) = mpsc::channel(16);
            stream.start(rx).await?;

            // 100ms blocks, paced like a live capture
            for chunk in samples.chunks(1600) {
                let block: Vec<f32> = chunk.iter().map(|&s| s as f32 / 32768.0).collect();
                tx.send(block).await.context("Stream pipeline closed early")?;
                tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            }
            drop(tx);

            stream.stop().await?;

            info!("Published {} frames", stream.frames_published());
            println!("{}", stream.transcript().await);
        }

        Command::ExportConfig {
            include_api_keys,
            include_session_data,
        } => {
            let token = settings::export_settings(
                store.as_ref(),
                ExportOptions {
                    include_api_keys,
                    include_session_data,
                },
            );
            println!("{}", token);
        }

        Command::ExportApiKeys => {
            let token = settings::export_api_keys(store.as_ref())?;
            println!("{}", token);
        }

        Command::ImportConfig { token } => {
            let written = settings::import_settings(store.as_ref(), &token)?;
            println!("Imported {} settings keys", written);
        }

        Command::Usage => {
            let ledger = UsageLedger::new(store);
            let entries = ledger.entries();
            if entries.is_empty() {
                println!("No usage recorded");
            } else {
                for entry in &entries {
                    println!(
                        "{}  {}/{}  in={} out={} total={}",
                        entry.timestamp,
                        entry.provider,
                        entry.model,
                        entry.input_tokens,
                        entry.output_tokens,
                        entry.total_tokens
                    );
                }
                println!("{} entries", entries.len());
            }
        }
    }

    Ok(())
}
