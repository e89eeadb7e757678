//! EqualType command line
//!
//! - `normalize`: canonicalize a raw analysis response for a text
//! - `verdict`: whole-text intervention verdict for a raw response
//! - `analyze`: one request against the analysis service
//! - `simulate`: play a scripted editing session on a virtual clock
//! - `watch`: live session over stdin, one JSON render state per change
//!
//! Output goes to stdout as JSON; logs go to stderr.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use analysis_scheduler::{spawn_session, Analyzer, Command, EditorSession, EngineConfig};
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use finding_engine::{assess_intervention, dominant, FindingEngine};
use serde::Serialize;
use serde_json::Value;
use shared_types::RenderState;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod http;
mod script;

use http::HttpAnalyzer;

#[derive(Parser, Debug)]
#[command(name = "equaltype")]
#[command(about = "Inclusive-language analysis engine")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Analysis service base URL (overrides config)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Request locale (overrides config)
    #[arg(long, global = true)]
    locale: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long, global = true, default_value = "10000")]
    timeout_ms: u64,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Normalize a raw response (file or stdin) against TEXT
    Normalize {
        #[arg(long)]
        text: String,
        /// Raw response file; stdin when omitted
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Intervention verdict for a raw response (file or stdin)
    Verdict {
        #[arg(long)]
        text: String,
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Analyze TEXT once against the service
    Analyze {
        #[arg(long)]
        text: String,
    },
    /// Play a JSON editing script on a virtual clock
    Simulate {
        script: PathBuf,
    },
    /// Feed stdin lines into a live session
    Watch {
        /// Time to wait for in-flight analysis after stdin closes
        #[arg(long, default_value = "3000")]
        settle_ms: u64,
    },
}

fn load_config(args: &Args) -> anyhow::Result<EngineConfig> {
    let config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    let mut config = config
        .with_env_overrides()
        .context("Invalid environment override")?;

    if let Some(endpoint) = &args.endpoint {
        config.request.endpoint = Some(endpoint.clone());
    }
    if let Some(locale) = &args.locale {
        config.request.locale = locale.clone();
    }
    Ok(config)
}

fn read_input(input: Option<&PathBuf>) -> anyhow::Result<Value> {
    let raw = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("Input is not valid JSON")
}

fn http_analyzer(config: &EngineConfig, timeout_ms: u64) -> anyhow::Result<HttpAnalyzer> {
    let Some(endpoint) = config.request.endpoint.as_deref() else {
        bail!("No analysis endpoint configured (use --endpoint or EQUALTYPE_ENDPOINT)");
    };
    HttpAnalyzer::new(endpoint, Duration::from_millis(timeout_ms))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One-shot render of a raw response for `text`
fn render_once(config: &EngineConfig, raw: &Value, text: &str) -> RenderState {
    let engine = FindingEngine::with_config(config.arbitration);
    let analysis = engine.process(raw, text);
    RenderState {
        markup: engine.render(text, &analysis.findings, None),
        dominant_finding_id: dominant(&analysis.findings).map(|f| f.id.clone()),
        copy_enabled: analysis.copy_enabled,
        blocked_message: analysis.popup_message,
        findings: analysis.findings,
    }
}

async fn watch(config: EngineConfig, analyzer: HttpAnalyzer, settle: Duration) -> anyhow::Result<()> {
    let (commands, mut render, handle) =
        spawn_session(EditorSession::new(&config), Arc::new(analyzer));

    let printer = tokio::spawn(async move {
        while render.changed().await.is_ok() {
            let state = render.borrow_and_update().clone();
            match serde_json::to_string(&state) {
                Ok(line) => println!("{}", line),
                Err(e) => tracing::warn!(error = %e, "Failed to encode render state"),
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut text = String::new();
    while let Some(line) = lines.next_line().await? {
        text.push_str(&line);
        text.push('\n');
        commands
            .send(Command::SetText(text.clone()))
            .await
            .context("Session stopped")?;
    }

    tokio::time::sleep(settle).await;
    drop(commands);
    let session = handle.await?;
    printer.await?;
    info!(chars = session.text().chars().count(), "Session closed");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load_config(&args)?;

    match &args.command {
        Cmd::Normalize { text, input } => {
            let raw = read_input(input.as_ref())?;
            print_json(&render_once(&config, &raw, text))
        }
        Cmd::Verdict { text, input } => {
            let raw = read_input(input.as_ref())?;
            print_json(&assess_intervention(&raw, text))
        }
        Cmd::Analyze { text } => {
            let analyzer = http_analyzer(&config, args.timeout_ms)?;
            let request = EditorSession::new(&config).request(text);
            info!(chars = text.chars().count(), "Analyzing");
            let raw = analyzer
                .analyze(request)
                .await
                .context("Analysis request failed")?;
            print_json(&render_once(&config, &raw, text))
        }
        Cmd::Simulate { script: path } => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read script: {}", path.display()))?;
            let parsed: script::Script =
                serde_json::from_str(&content).context("Failed to parse script")?;
            print_json(&script::run_script(&config, &parsed))
        }
        Cmd::Watch { settle_ms } => {
            let analyzer = http_analyzer(&config, args.timeout_ms)?;
            watch(config, analyzer, Duration::from_millis(*settle_ms)).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_cli_parses_subcommands() {
        let args = Args::try_parse_from(["equaltype", "--verbose", "normalize", "--text", "hi"]).unwrap();
        assert!(args.verbose);
        assert!(matches!(args.command, Cmd::Normalize { ref text, input: None } if text == "hi"));

        let args = Args::try_parse_from(["equaltype", "watch", "--endpoint", "http://x"]).unwrap();
        assert_eq!(args.endpoint.as_deref(), Some("http://x"));
        assert!(matches!(args.command, Cmd::Watch { settle_ms: 3000 }));
    }

    #[test]
    fn test_render_once_uses_popup_message() {
        let raw = json!({"data": {"findings": [], "copy_enabled": false, "popup_message": "Rephrase"}});
        let state = render_once(&EngineConfig::default(), &raw, "text");
        assert_eq!(state.blocked_message.as_deref(), Some("Rephrase"));
        assert!(!state.copy_enabled);
        assert_eq!(state.markup, "text");
    }

    #[test]
    fn test_analyzer_requires_endpoint() {
        assert!(http_analyzer(&EngineConfig::default(), 1000).is_err());
    }
}
