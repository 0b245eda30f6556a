//! Context Fill
//!
//! Serves the extraction and submission API, or runs a single extraction or
//! form fill from the command line.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use context_fill::config::DEFAULT_MODEL;
use context_fill::form::{detect_forms, Page};
use context_fill::llm::{ContactExtractor, DocumentExtractor, GeminiClient};
use context_fill::{ExtractedRecord, ServerConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "context-fill", version, about = "Extract contact details from documents and fill web forms")]
struct Cli {
    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Gemini model used for extraction
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL, global = true)]
    model: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Listen address
        #[arg(short, long, env = "CONTEXT_FILL_LISTEN", default_value = "127.0.0.1:3000")]
        listen: SocketAddr,

        /// Journal file for form submissions; kept in memory when omitted
        #[arg(long, env = "CONTEXT_FILL_LOG")]
        log: Option<PathBuf>,

        /// Override the Gemini endpoint
        #[arg(long, env = "GEMINI_BASE_URL")]
        gemini_base_url: Option<String>,
    },
    /// Extract contact fields from a PDF or image and print them as JSON
    Extract {
        file: PathBuf,
    },
    /// Fill a form in an HTML file with a JSON record and print the result
    Fill {
        #[arg(long)]
        html: PathBuf,

        #[arg(long)]
        record: PathBuf,

        /// Form id or name; the first detected form when omitted
        #[arg(long)]
        form: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            listen,
            log,
            gemini_base_url,
        } => {
            let config = ServerConfig {
                listen_addr: listen.to_string(),
                api_key: cli.api_key,
                model: cli.model,
                gemini_base_url,
                journal_path: log,
                ..ServerConfig::default()
            };
            context_fill::server::serve(config).await
        }
        Command::Extract { file } => extract(&file, cli.api_key, cli.model).await,
        Command::Fill { html, record, form } => fill(&html, &record, form.as_deref()),
    }
}

async fn extract(file: &Path, api_key: Option<String>, model: String) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let mime_type = mime_guess::from_path(file)
        .first_or_octet_stream()
        .essence_str()
        .to_string();

    let extractor = ContactExtractor::new(GeminiClient::with_optional_key(api_key), model);
    let record = extractor.extract(&bytes, &mime_type).await?;

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn fill(html: &Path, record: &Path, form: Option<&str>) -> anyhow::Result<()> {
    let html = std::fs::read_to_string(html)
        .with_context(|| format!("failed to read {}", html.display()))?;
    let record_json = std::fs::read_to_string(record)
        .with_context(|| format!("failed to read {}", record.display()))?;
    let record: ExtractedRecord =
        serde_json::from_str(&record_json).context("record is not a valid JSON object")?;

    let mut page = Page::parse(&html);
    let forms = detect_forms(&page);

    let target = match form {
        Some(wanted) => forms
            .iter()
            .find(|f| f.id == wanted || f.name == wanted)
            .with_context(|| format!("no form named {wanted}"))?,
        None => match forms.first() {
            Some(first) => first,
            None => bail!("no fillable forms found"),
        },
    };

    let filled = page.fill(target, &record);
    tracing::info!("Filled {} field(s) in {}", filled, target.name);

    let values: serde_json::Map<String, serde_json::Value> = page
        .form(target)
        .map(|f| {
            f.controls
                .iter()
                .filter_map(|c| Some((c.field_name()?.to_string(), c.value.clone().into())))
                .collect()
        })
        .unwrap_or_default();

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "form": target.id,
            "filled": filled,
            "values": values,
        }))?
    );
    Ok(())
}
