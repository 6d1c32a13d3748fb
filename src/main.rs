use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use email_crew::config::PipelineConfig;
use email_crew::history::{History, DEFAULT_RECENT};
use email_crew::pipeline::EmailPipeline;
use email_crew::shell::{self, EmailSource};

#[derive(Parser)]
#[command(name = "email-crew")]
#[command(about = "Summarize an email, then review the summary with a language model")]
#[command(version)]
struct Cli {
    /// Email files to process. Reads stdin when none are given.
    files: Vec<PathBuf>,

    /// Refine each summary using its review as feedback.
    #[arg(short, long)]
    refine: bool,

    /// Number of recent history entries to show at the end (0 to hide).
    #[arg(long, default_value_t = DEFAULT_RECENT)]
    history: usize,

    /// Print each result as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = PipelineConfig::from_env().context("Invalid configuration")?;

    eprintln!("email-crew v{}", env!("CARGO_PKG_VERSION"));
    if config.has_credential() {
        eprintln!("   Backend: {} (model: {})", config.backend, config.model);
    } else {
        eprintln!(
            "   {} not set, using offline fallback output",
            config.backend.api_key_var()
        );
    }

    let history = Arc::new(History::new());
    let pipeline = EmailPipeline::from_config(&config).with_recorder(history.clone());

    let sources: Vec<EmailSource> = if cli.files.is_empty() {
        vec![EmailSource::Stdin]
    } else {
        cli.files.into_iter().map(EmailSource::File).collect()
    };

    let mut processed = 0usize;
    for source in &sources {
        let email = match shell::load_email(source).await {
            Ok(email) => email,
            Err(e) => {
                eprintln!("Skipping {source}: {e}");
                continue;
            }
        };

        let result = pipeline.process(&email).await;
        processed += 1;

        let refined = if cli.refine && result.is_success() {
            Some(pipeline.refine(&email, &result.summary, &result.review).await)
        } else {
            None
        };

        if cli.json {
            let mut value = serde_json::to_value(&result)?;
            value["source"] = serde_json::Value::String(source.to_string());
            if let Some(ref refined) = refined {
                value["refined_summary"] = serde_json::Value::String(refined.clone());
            }
            println!("{}", serde_json::to_string_pretty(&value)?);
        } else {
            print!("{}", shell::render_result(source, &result));
            if let Some(ref refined) = refined {
                print!("{}", shell::render_refined(refined));
            }
            println!();
        }
    }

    if processed == 0 {
        anyhow::bail!("No email was processed");
    }

    if cli.history > 0 {
        eprintln!("\nRecent emails:");
        eprint!(
            "{}",
            shell::render_history(&history.stats(), &history.recent(cli.history))
        );
    }

    Ok(())
}
