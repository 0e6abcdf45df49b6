//! Lectern CLI - one-shot LLM completions from the terminal.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use lectern::{DEFAULT_MODEL, GenerateOptions, Generator, load_api_keys, truncate_lines};

/// One-shot LLM completions from the terminal.
#[derive(Parser)]
#[command(name = "lectern")]
#[command(about = "Minimal helpers for calling LLM completion APIs")]
#[command(version)]
struct Cli {
    /// User prompt
    prompt: String,

    /// `provider/model` identifier
    #[arg(short, long, default_value = DEFAULT_MODEL)]
    model: String,

    /// System prompt
    #[arg(short, long, default_value = "")]
    system: String,

    /// Sampling temperature (0 = deterministic, 1 = very random)
    #[arg(short, long)]
    temperature: Option<f32>,

    /// Output token budget
    #[arg(long, default_value_t = 200)]
    max_tokens: u32,

    /// Fetch a secrets file from this URL into `.env` before generating
    #[arg(long)]
    keys_url: Option<String>,

    /// Parse a JSON value out of the response and pretty-print it
    #[arg(long)]
    json: bool,

    /// Truncate output after this many non-blank lines
    #[arg(long)]
    max_lines: Option<usize>,

    /// Suppress token-by-token echo
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Some(url) = &cli.keys_url {
        load_api_keys(url).await?;
    } else {
        // Pick up a local .env if one is present
        let _ = dotenvy::dotenv();
    }

    // Token-by-token echo only makes sense when the raw text is the output
    let echo = !cli.quiet && !cli.json && cli.max_lines.is_none();

    let generator = Generator::from_env();
    let opts = GenerateOptions {
        model: cli.model,
        system_prompt: cli.system,
        verbose: echo,
        temperature: cli.temperature,
        max_tokens: cli.max_tokens,
        ..Default::default()
    };

    if cli.json {
        let value = generator.generate_json(&cli.prompt, &opts).await?;
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let text = generator.generate_text(&cli.prompt, &opts).await?;
    if echo {
        println!();
    } else {
        let text = match cli.max_lines {
            Some(max_lines) => truncate_lines(&text, max_lines),
            None => text,
        };
        println!("{text}");
    }

    Ok(())
}
