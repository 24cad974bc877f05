//! Watchbridge CLI - wb command

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use crossbeam_channel::unbounded;
use engine::{EffectType, Event, Session, WatchOptions};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::time::Duration;

/// Watchbridge - stream filesystem events from the watch engine
#[derive(Parser)]
#[command(name = "wb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch a path and print one line per filesystem event
    Watch {
        /// Path to watch
        path: PathBuf,

        /// Watch only the path itself, not its subtree
        #[arg(long)]
        no_recursive: bool,

        /// Backend latency hint in milliseconds (default: 150)
        #[arg(long, default_value = "150")]
        latency_ms: u64,

        /// Only print paths matching these gitignore-style globs
        #[arg(short, long)]
        pattern: Vec<String>,

        /// Only print these effect types
        /// (rename, modify, create, destroy, owner, other)
        #[arg(short, long)]
        effect: Vec<String>,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Watch {
            path,
            no_recursive,
            latency_ms,
            pattern,
            effect,
        } => watch(path, no_recursive, latency_ms, pattern, effect),
    }
}

fn watch(
    path: PathBuf,
    no_recursive: bool,
    latency_ms: u64,
    patterns: Vec<String>,
    effects: Vec<String>,
) -> Result<()> {
    let mut options = WatchOptions::new()
        .with_recursive(!no_recursive)
        .with_latency(Duration::from_millis(latency_ms))
        .with_patterns(patterns);

    if !effects.is_empty() {
        let mut parsed = Vec::with_capacity(effects.len());
        for name in &effects {
            match EffectType::parse(name) {
                Some(effect) => parsed.push(effect),
                None => bail!("unknown effect type: {}", name),
            }
        }
        options = options.with_effect_filters(parsed);
    }

    // Hand events off the engine thread immediately; printing happens here
    let (tx, rx) = unbounded();
    let session = Session::open(
        &path,
        options,
        Box::new(move |ev| {
            let _ = tx.send(ev);
        }),
    )
    .with_context(|| format!("cannot watch {}", path.display()))?;

    tracing::info!("watching {} (ctrl-c to stop)", session.path().display());

    for ev in rx.iter() {
        print_event(&ev);
    }

    Ok(())
}

fn print_event(ev: &Event) {
    let effect = match ev.effect {
        EffectType::Create => ev.effect.as_str().green().to_string(),
        EffectType::Destroy => ev.effect.as_str().red().to_string(),
        EffectType::Rename => ev.effect.as_str().yellow().to_string(),
        EffectType::Modify => ev.effect.as_str().cyan().to_string(),
        _ => ev.effect.as_str().to_string(),
    };
    println!(
        "{:<22} {:<10} {}",
        effect,
        ev.path_type.as_str(),
        ev.path.display()
    );
}
