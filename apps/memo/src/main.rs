use anyhow::Context;
use clap::{Parser, Subcommand};
use memo_lib::commands::{self, TerminalNotifier};
use memo_lib::{NullNotifier, Session, Settings};
use std::io;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "memo", version, about = "Spaced-repetition review queue")]
struct Cli {
    /// Problem store file; its folder is scanned for problems
    #[arg(long, global = true, env = "MEMO_DB")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Review due and weak problems
    Review,
    /// Register new problem files
    Rescan,
    /// Show review statistics
    Stats {
        /// Number of days of history
        #[arg(long, default_value_t = 14)]
        days: usize,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    memo_lib::init_tracing();

    let cli = Cli::parse();
    let mut settings = Settings::load().context("failed to load settings")?;
    if let Some(db) = cli.db {
        settings.store_path = db;
    }
    tracing::debug!("Using problem store {}", settings.store_path.display());

    match cli.command {
        Command::Review => {
            let mut session = Session::new(settings, TerminalNotifier::new(io::stdout()));
            let graded = commands::review(&mut session, io::stdin().lock());
            session.shutdown();
            println!("{} problems graded", graded?);
        }
        Command::Rescan => {
            let mut session = Session::new(settings, NullNotifier);
            commands::rescan(&mut session, &mut io::stdout())?;
            session.shutdown();
        }
        Command::Stats { days } => {
            let mut session = Session::new(settings, NullNotifier);
            commands::stats(&mut session, days, &mut io::stdout())?;
            session.shutdown();
        }
    }

    Ok(())
}
