//! PromptGuard - sensitive-content screening for LLM prompts
//!
//! Detects, redacts and scores sensitive content in prompts before they are
//! sent to a third-party model, and encrypts stored prompts at rest.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use promptguard::{
    api::{build_app, ApiState},
    config::PromptGuardConfig,
    crypto::{EncryptedBlob, EncryptionKey, EnvelopeCipher, DECRYPTION_FAILED},
    pipeline::Pipeline,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "promptguard")]
#[command(version)]
#[command(about = "Sensitive-content detection, redaction and encryption for LLM prompts")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "PROMPTGUARD_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a prompt and print the result as JSON
    Analyze {
        /// Prompt text (read from stdin when omitted)
        text: Option<String>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Encrypt a prompt for storage
    Encrypt {
        /// Prompt text (read from stdin when omitted)
        text: Option<String>,
    },

    /// Decrypt a stored prompt
    Decrypt {
        /// Encrypted blob (read from stdin when omitted)
        blob: Option<String>,
    },

    /// Print a truncated preview of a stored prompt
    Preview {
        /// Encrypted blob (read from stdin when omitted)
        blob: Option<String>,

        /// Maximum preview length in characters
        #[arg(long)]
        max_len: Option<usize>,
    },

    /// Generate a new base64 encryption key
    Keygen,

    /// Start the HTTP server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
    },

    /// Check configuration, key and catalog
    Doctor,

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.log_json);

    let config = match &cli.config {
        Some(path) => PromptGuardConfig::from_file(path)?,
        None => PromptGuardConfig::default(),
    };

    match cli.command {
        Commands::Analyze { text, pretty } => {
            run_analyze(&config, input_or_stdin(text).await?, pretty)?;
        }
        Commands::Encrypt { text } => {
            let cipher = EnvelopeCipher::from_config(&config.crypto)?;
            println!("{}", cipher.encrypt(&input_or_stdin(text).await?)?);
        }
        Commands::Decrypt { blob } => {
            run_decrypt(&config, input_or_stdin(blob).await?)?;
        }
        Commands::Preview { blob, max_len } => {
            let cipher = EnvelopeCipher::from_config(&config.crypto)?;
            let max_len = max_len.unwrap_or(config.server.preview_len);
            println!("{}", cipher.preview(&input_or_stdin(blob).await?, max_len));
        }
        Commands::Keygen => {
            println!("{}", EncryptionKey::generate().to_base64());
        }
        Commands::Serve { host, port } => {
            run_server(config, host, port).await?;
        }
        Commands::Doctor => {
            run_doctor(&config);
        }
        Commands::Config { default } => {
            show_config(if default { None } else { Some(&config) })?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool, json: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("promptguard={},tower_http=debug", log_level).into());
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so command output on stdout stays machine-readable
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn input_or_stdin(arg: Option<String>) -> Result<String> {
    if let Some(text) = arg {
        return Ok(text);
    }
    let mut buf = String::new();
    tokio::io::stdin()
        .read_to_string(&mut buf)
        .await
        .context("Failed to read stdin")?;
    Ok(buf.trim_end_matches(&['\r', '\n'][..]).to_string())
}

fn run_analyze(config: &PromptGuardConfig, prompt: String, pretty: bool) -> Result<()> {
    let pipeline = Pipeline::new(config)?;
    let response = pipeline.analyze(&prompt);
    let json = if pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{}", json);
    Ok(())
}

fn run_decrypt(config: &PromptGuardConfig, blob: String) -> Result<()> {
    let cipher = EnvelopeCipher::from_config(&config.crypto)?;
    match cipher.decrypt(&blob) {
        Ok(plaintext) => {
            println!("{}", plaintext);
            Ok(())
        }
        Err(e) => {
            println!("{}", DECRYPTION_FAILED);
            anyhow::bail!("Decryption failed: {}", e)
        }
    }
}

async fn run_server(config: PromptGuardConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    // A missing key stops startup here, before anything is served
    let cipher = EnvelopeCipher::from_config(&config.crypto)?;
    let pipeline = Pipeline::new(&config)?;

    let state = ApiState {
        pipeline: Arc::new(pipeline),
        cipher: Arc::new(cipher),
        preview_len: config.server.preview_len,
    };
    let app = build_app(state, &config.server.cors_origins);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("PromptGuard listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}

fn run_doctor(config: &PromptGuardConfig) {
    println!("PromptGuard Doctor");
    println!();

    println!("Checking encryption key...");
    match EncryptionKey::from_config(&config.crypto) {
        Ok(key) => {
            let cipher = EnvelopeCipher::new(&key);
            let probe = cipher
                .encrypt("doctor probe")
                .map(|blob| EncryptedBlob::looks_encrypted(&blob) && cipher.decrypt(&blob).is_ok());
            match probe {
                Ok(true) => println!("  ✓ Key loaded, encrypt/decrypt round trip ok"),
                _ => println!("  ✗ Key loaded but round trip failed"),
            }
        }
        Err(e) => println!("  ✗ {}", e),
    }

    println!();
    println!("Checking detector catalog...");
    match Pipeline::new(config) {
        Ok(pipeline) => println!("  ✓ {} detectors compiled", pipeline.catalog().len()),
        Err(e) => println!("  ✗ {}", e),
    }

    println!();
    println!("Doctor check complete!");
}

fn show_config(config: Option<&PromptGuardConfig>) -> Result<()> {
    let config = config.cloned().unwrap_or_default();
    println!("{}", config.to_toml()?);
    Ok(())
}
