//! Murmur CLI — offline harness for the murmur resolution engine.
//!
//! Feeds transcripts to the resolver without any audio or transcription
//! backend: pass one phrase as an argument for a one-shot resolution, or
//! run without arguments for an interactive loop that keeps interaction
//! state across lines. Useful for exercising a command configuration
//! before wiring it to a live transcription source.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use murmur_core::{
    CommandRegistry, InteractionState, MurmurConfig, Resolution, Resolver, create_embedder,
};

/// Murmur: resolve spoken phrases into executable commands
#[derive(Parser, Debug)]
#[command(name = "murmur", version, about, long_about = None)]
struct Cli {
    /// Transcript to resolve (starts the interactive loop if omitted)
    transcript: Option<String>,

    /// Command configuration file
    #[arg(short, long, default_value = "config/commands.toml")]
    config: PathBuf,

    /// Print resolutions as JSON
    #[arg(long)]
    json: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = MurmurConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let embedder = create_embedder(&config.matcher.embedding);
    let registry = CommandRegistry::new(&config, embedder).context("building command registry")?;
    let resolver = Resolver::new(registry, &config.matcher);

    let mut state = InteractionState::new();

    if let Some(transcript) = cli.transcript {
        report(resolver.resolve(&transcript, &mut state), &state, cli.json);
        return Ok(());
    }

    // Interactive loop: one transcript per line, state carried across
    // lines the way a live session carries it across utterances.
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        write!(stdout, "murmur> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }
        report(resolver.resolve(line, &mut state), &state, cli.json);
    }

    Ok(())
}

fn report(resolution: Option<Resolution>, state: &InteractionState, json: bool) {
    match resolution {
        Some(res) if json => {
            println!("{}", serde_json::to_string_pretty(&res).unwrap_or_default());
        }
        Some(res) => {
            println!(
                "matched {} (confidence {:.2}): {:?}",
                res.command_id, res.confidence, res.action
            );
            if let Some(feedback) = &res.feedback {
                println!("  {}", feedback);
            }
            println!(
                "  state: mode={} app={}",
                state.mode(),
                state.active_app().unwrap_or("none")
            );
        }
        None if json => println!("null"),
        None => println!("no match"),
    }
}

fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
