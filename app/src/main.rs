//! wikirag: answer questions from Wikipedia passages with local Ollama models.
//!
//! Usage:
//!   wikirag ask "Who came up with the concept of gravity?"
//!   wikirag ask --json "Who proposed the theory of relativity?"
//!   wikirag chat                         # interactive session
//!   wikirag health                       # check the local Ollama server

mod render;
mod session;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use wikirag_ai::embeddings::ollama_embed::OllamaEmbedder;
use wikirag_ai::generate::LlmAnswerModel;
use wikirag_ai::knowledge::wikipedia::WikipediaClient;
use wikirag_ai::llm::ollama_llm::OllamaLlm;
use wikirag_ai::ollama::OllamaClient;
use wikirag_ai::pipeline::RagPipeline;
use wikirag_core::config::{AppConfig, PipelineConfig};
use wikirag_core::context::preview;
use wikirag_core::domain::AnswerResult;

use crate::session::{ChatSession, GREETING};

#[derive(Parser, Debug)]
#[command(name = "wikirag", version, about = "Answer questions from Wikipedia with local models")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Replace the [pipeline] section with a built-in preset
    #[arg(long, value_enum, global = true)]
    preset: Option<Preset>,

    /// Number of chunks passed to the generator
    #[arg(long, global = true)]
    top_k: Option<usize>,

    /// Number of Wikipedia articles to read per query
    #[arg(long, global = true)]
    max_articles: Option<usize>,

    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Answer a single question and exit
    Ask {
        /// The question (multiple words are joined with spaces)
        #[arg(required = true)]
        query: Vec<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Interactive question answering
    Chat {
        /// Delay between revealed words, in milliseconds
        #[arg(long, default_value_t = 50)]
        reveal_delay_ms: u64,
    },
    /// Check that the local Ollama server is reachable
    Health,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Preset {
    Script,
    Chat,
}

#[derive(Serialize)]
struct AskOutput<'a> {
    query: &'a str,
    #[serde(flatten)]
    result: &'a AnswerResult,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "wikirag=debug,wikirag_ai=debug,wikirag_core=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let config = resolve_config(&cli)?;
    let client = OllamaClient::new(&config.ollama.base_url)?
        .with_timeout(Duration::from_secs(config.ollama.timeout_secs));

    if let Command::Health = cli.command {
        client.health_check()?;
        println!("Ollama is reachable at {}", client.base_url());
        return Ok(());
    }

    // Capabilities are built once and shared by every query.
    let source = WikipediaClient::new(&config.wikipedia);
    let embedder = OllamaEmbedder::new(client.clone());
    let answerer = LlmAnswerModel::new(
        OllamaLlm::new(client).with_json_output(true),
        config.ollama.generate_model.clone(),
    );
    let pipeline = RagPipeline::new(
        &source,
        &embedder,
        config.ollama.embed_model.clone(),
        &answerer,
        config.pipeline.clone(),
    )?;

    match &cli.command {
        Command::Ask { query, json } => ask(&pipeline, &query.join(" "), *json),
        Command::Chat { reveal_delay_ms } => chat(&pipeline, Duration::from_millis(*reveal_delay_ms)),
        Command::Health => Ok(()),
    }
}

fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    let preset = match (cli.preset, &cli.command, &cli.config) {
        (Some(p), _, _) => Some(p),
        // The chat front end has its own defaults unless a file says otherwise.
        (None, Command::Chat { .. }, None) => Some(Preset::Chat),
        _ => None,
    };
    if let Some(preset) = preset {
        config.pipeline = match preset {
            Preset::Script => PipelineConfig::script(),
            Preset::Chat => PipelineConfig::chat(),
        };
    }
    if let Some(top_k) = cli.top_k {
        config.pipeline.top_k = top_k;
    }
    if let Some(max_articles) = cli.max_articles {
        config.pipeline.max_articles = max_articles;
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn ask(pipeline: &RagPipeline<'_>, query: &str, json: bool) -> Result<()> {
    let result = pipeline.run(query, None)?;

    if json {
        let out = AskOutput {
            query,
            result: &result,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Query: {query}");
    println!("Retrieved Context (Top chunks):\n{}", preview(&result.context, 500));
    println!("Answer: {}", result.answer);
    println!("Confidence: {}", result.confidence);
    Ok(())
}

fn chat(pipeline: &RagPipeline<'_>, reveal_delay: Duration) -> Result<()> {
    let mut session = ChatSession::new();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("AI: {GREETING}");
    println!("(type \"exit\" to quit)");

    loop {
        print!("You: ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            break;
        }
        let input = line.trim();
        if matches!(input, "exit" | "quit") {
            break;
        }

        let prompt = match session.submit(input) {
            Ok(prompt) => prompt,
            Err(e) if e.is("SESSION_INPUT_EMPTY") => continue,
            Err(e) => {
                eprintln!("Error: {e}");
                continue;
            }
        };

        match session.resolve(pipeline.ask(&prompt)) {
            Ok(reply) => {
                print!("AI: ");
                render::reveal_words(&mut stdout, &reply.text, reveal_delay)
                    .context("failed to write answer")?;
            }
            Err(e) => eprintln!("Error: {e}"),
        }
        debug_assert!(session.pending().is_none());
    }

    tracing::debug!(messages = session.messages().len(), "chat session ended");
    Ok(())
}
