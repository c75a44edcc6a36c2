//! norn: natural-language date interpretation CLI

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use norn::providers::OllamaProvider;
use norn::providers::ollama::DEFAULT_OLLAMA_URL;
use norn::settings::Settings;
use norn::{CancellationToken, DateInterpreter, InterpretationRequest, ProviderId};

/// Norn CLI
#[derive(Parser)]
#[command(name = "norn")]
#[command(version = norn::PKG_VERSION)]
#[command(about = "Turn natural-language date expressions into timestamps")]
struct Args {
    /// Settings file (default: ~/.norn/config.toml, then /etc/norn/config.toml)
    #[arg(short, long, env = "NORN_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interpret a date expression
    Interpret {
        /// Text to interpret (or omit to read from stdin)
        text: Option<String>,
        /// Provider to use (ollama, lm-studio, on-device, cloud)
        #[arg(short, long)]
        provider: Option<ProviderId>,
        /// IANA timezone name (e.g. "Europe/Oslo")
        #[arg(short, long)]
        timezone: Option<String>,
        /// BCP 47 locale tag
        #[arg(short, long)]
        locale: Option<String>,
        /// Reference instant, RFC 3339 (default: now)
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },

    /// List registered providers
    Providers,

    /// List models pulled on an Ollama server
    Models {
        /// Server base URL (default: from settings, then the local default)
        #[arg(long)]
        base_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref())?;

    match args.command {
        Command::Interpret {
            text,
            provider,
            timezone,
            locale,
            now,
        } => {
            let text = resolve_text(text)?;
            let provider = provider
                .or(settings.provider)
                .unwrap_or(ProviderId::Ollama);

            let signal = CancellationToken::new();
            let on_interrupt = signal.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_interrupt.cancel();
                }
            });

            let mut request = InterpretationRequest::new(text).signal(signal);
            if let Some(tz) = timezone.or_else(|| settings.timezone.clone()) {
                request = request.timezone(tz);
            }
            if let Some(locale) = locale.or_else(|| settings.locale.clone()) {
                request = request.locale(locale);
            }
            if let Some(now) = now {
                request = request.now(now);
            }
            let request = request.with_config(settings.provider_config(provider));

            let interpreter = DateInterpreter::builder().default_providers().build()?;
            let result = interpreter.interpret_date(provider, request).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Command::Providers => {
            let interpreter = DateInterpreter::builder().default_providers().build()?;
            for info in interpreter.catalog() {
                let state = if info.enabled { "" } else { " [coming soon]" };
                println!("{:<10} {}{state}", info.id, info.name);
                println!("           {}", info.description);
                if let Some(url) = &info.docs_url {
                    println!("           {url}");
                }
            }
        }

        Command::Models { base_url } => {
            let base_url = base_url
                .or_else(|| {
                    settings
                        .provider_config(ProviderId::Ollama)
                        .get("baseUrl")
                        .and_then(|v| v.as_str())
                        .map(str::to_string)
                })
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());
            let models = OllamaProvider::new()?.list_models(&base_url).await?;
            if models.is_empty() {
                println!("no models available");
            } else {
                for model in models {
                    println!("{model}");
                }
            }
        }
    }

    Ok(())
}

/// Resolve the prompt from an optional argument and/or stdin.
///
/// - arg only → arg
/// - stdin only → stdin
/// - both → `"{arg} {stdin}"`
/// - neither → error
fn resolve_text(arg: Option<String>) -> Result<String, Box<dyn std::error::Error>> {
    let stdin_text = if io::stdin().is_terminal() {
        None
    } else {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        let trimmed = buf.trim().to_string();
        (!trimmed.is_empty()).then_some(trimmed)
    };

    match (arg, stdin_text) {
        (Some(a), Some(s)) => Ok(format!("{a} {s}")),
        (Some(a), None) => Ok(a),
        (None, Some(s)) => Ok(s),
        (None, None) => {
            Err("interpret: no input provided (pass text as argument or via stdin)".into())
        }
    }
}
