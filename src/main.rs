// src/main.rs
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::sync::mpsc;

use digest_card::chat::{parse_chat_log, parse_timestamp, MessageWindow};
use digest_card::extractors::{self, Fallbacks, FixedFallbacks, SeededFallbacks};
use digest_card::render::to_markdown;
use digest_card::storage::{document_slug, StorageManager};
use digest_card::stream::{PreviewSession, StreamState, Ticket, Update};
use digest_card::utils::error::{ChatError, StreamError};
use digest_card::utils::{self, AppError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Markdown,
}

/// Command Line Interface for the digest report parser
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Report file to parse; omit or pass "-" to read stdin
    input: Option<PathBuf>,

    /// Output format written to stdout
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Treat the input as a server-sent-event transcript from the summarizer
    #[arg(long)]
    sse: bool,

    /// Seed for randomized fallbacks (omitted fields); fixed defaults when unset
    #[arg(long, env = "DIGEST_FALLBACK_SEED")]
    seed: Option<u64>,

    /// Also save JSON, Markdown and metadata files into this directory
    #[arg(short, long, env = "DIGEST_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Chat log export to search (used with --seek)
    #[arg(long, requires = "seek")]
    chat: Option<PathBuf>,

    /// Timestamp (YYYY-MM-DD HH:MM:SS) to locate in the chat log
    #[arg(long, requires = "chat")]
    seek: Option<String>,

    /// Viewport height in pixels used when centering the --seek target
    #[arg(long, default_value = "600", value_parser = parse_viewport)]
    viewport: f64,
}

fn parse_viewport(value: &str) -> Result<f64, String> {
    let height: f64 = value.parse().map_err(|e| format!("{}", e))?;
    if height.is_finite() && height >= 0.0 {
        Ok(height)
    } else {
        Err(format!("viewport must be a finite, non-negative height, got {}", value))
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::debug!("Starting with args: {:?}", args);

    // 3. Chat seek mode is independent of report parsing
    if let (Some(chat_path), Some(seek)) = (&args.chat, &args.seek) {
        return seek_chat(chat_path, seek, args.viewport).await;
    }

    // 4. Pick the fallback source for omitted fields
    let mut fallbacks: Box<dyn Fallbacks> = match args.seed {
        Some(seed) => {
            tracing::info!("Using seeded fallbacks (seed {})", seed);
            Box::new(SeededFallbacks::new(seed))
        }
        None => Box::new(FixedFallbacks::default()),
    };

    // 5. Read and parse the report
    let input = args.input.as_deref().filter(|p| *p != Path::new("-"));
    let document = if args.sse {
        let text = collect_stream(input).await?;
        extractors::parse_with(&text, fallbacks.as_mut())
    } else {
        let text = read_input(input).await?;
        tracing::info!("Read {} bytes of report text", text.len());
        extractors::parse_with(&text, fallbacks.as_mut())
    };

    if document.is_empty() {
        tracing::warn!("No tagged sections found in input; emitting defaults");
    }

    // 6. Emit
    let rendered = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&document)?,
        OutputFormat::Markdown => to_markdown(&document),
    };
    println!("{}", rendered.trim_end());

    // 7. Optionally persist
    if let Some(dir) = &args.output_dir {
        let storage = StorageManager::new(dir)?;
        let saved = storage.save_document(&document, &document_slug(&document))?;
        tracing::info!(
            "Saved {} (+ Markdown and metadata) under {}",
            saved.json_path.display(),
            storage.base_dir().display()
        );
    }

    Ok(())
}

async fn open_input(path: Option<&Path>) -> Result<Box<dyn AsyncRead + Unpin + Send>, AppError> {
    match path {
        Some(path) => {
            let file = tokio::fs::File::open(path).await.map_err(|e| {
                AppError::Config(format!("Cannot open input {}: {}", path.display(), e))
            })?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(tokio::io::stdin())),
    }
}

async fn read_input(path: Option<&Path>) -> Result<String, AppError> {
    let mut reader = open_input(path).await?;
    let mut text = String::new();
    reader.read_to_string(&mut text).await?;
    Ok(text)
}

/// Feeds the transcript line by line through a channel into a preview
/// session and returns the accumulated report text.
async fn collect_stream(path: Option<&Path>) -> Result<String, AppError> {
    let reader = open_input(path).await?;
    let mut session = PreviewSession::new();
    let ticket = session.begin();
    let (tx, rx) = mpsc::channel::<Update>(64);

    let feeder = tokio::spawn(feed_lines(reader, ticket, tx));
    session.run(rx).await;
    if session.is_finished() {
        // Nothing after the terminal frame is used; stdin may never reach EOF.
        feeder.abort();
    }

    match feeder.await {
        Ok(Ok(lines)) => tracing::debug!("Fed {} transcript lines", lines),
        Ok(Err(AppError::Stream(StreamError::ChannelClosed))) => {
            tracing::debug!("Transcript has trailing lines after the done signal");
        }
        Ok(Err(e)) => return Err(e),
        Err(e) if e.is_cancelled() => tracing::debug!("Stopped reading transcript after done signal"),
        Err(e) => return Err(AppError::Processing(format!("Transcript reader failed: {}", e))),
    }

    let accumulator = session
        .accumulator()
        .ok_or_else(|| AppError::Processing("Stream session was never started".to_string()))?;
    if let StreamState::Failed(message) = accumulator.state() {
        tracing::error!("Summarizer stream failed: {}", message);
        return Err(AppError::Processing(format!("Summarizer stream failed: {}", message)));
    }
    tracing::info!(
        "Accumulated {} bytes from stream (model: {})",
        accumulator.text().len(),
        accumulator.model().unwrap_or("unknown")
    );
    Ok(accumulator.text().to_string())
}

async fn feed_lines(
    reader: Box<dyn AsyncRead + Unpin + Send>,
    ticket: Ticket,
    tx: mpsc::Sender<Update>,
) -> Result<usize, AppError> {
    let mut lines = BufReader::new(reader).lines();
    let mut count = 0;
    while let Some(line) = lines.next_line().await? {
        tx.send(Update { ticket, line })
            .await
            .map_err(|_| StreamError::ChannelClosed)?;
        count += 1;
    }
    Ok(count)
}

async fn seek_chat(chat_path: &Path, seek: &str, viewport: f64) -> Result<(), AppError> {
    let target = parse_timestamp(seek)?;
    let raw = tokio::fs::read_to_string(chat_path).await?;
    let messages = parse_chat_log(&raw);
    tracing::info!("Loaded {} chat messages from {}", messages.len(), chat_path.display());

    let window = MessageWindow::new(&messages);
    let scroll = window.scroll_to(target, viewport).ok_or(ChatError::EmptyLog)?;
    let message = &messages[scroll.index];

    let output = serde_json::json!({
        "target": scroll,
        "message": message,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
