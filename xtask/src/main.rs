use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for outrun")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run fmt, clippy, and tests
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy with warnings denied
    Clippy,
    /// Run tests, optionally for one crate
    Test {
        #[arg(short, long)]
        package: Option<String>,
    },
    /// Run the terrain grid benchmark
    Bench,
    /// Run the frame loop headless through outrun-cli
    Smoke {
        #[arg(short, long, default_value = "600")]
        frames: u64,
    },
}

/// Run one cargo invocation, failing with `what` on a non-zero exit.
fn cargo(what: &str, args: &[&str]) -> Result<()> {
    println!("==> cargo {}", args.join(" "));
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("{what} failed");
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            cargo("fmt check", &["fmt", "--all", "--", "--check"])?;
            cargo("clippy", &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"])?;
            cargo("tests", &["test", "--workspace"])?;
        }
        Commands::Fmt => cargo("fmt check", &["fmt", "--all", "--", "--check"])?,
        Commands::Clippy => {
            cargo("clippy", &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"])?
        }
        Commands::Test { package } => match package {
            Some(name) => cargo("tests", &["test", "-p", &name])?,
            None => cargo("tests", &["test", "--workspace"])?,
        },
        Commands::Bench => cargo("bench", &["bench", "-p", "outrun-terrain"])?,
        Commands::Smoke { frames } => {
            let frames = frames.to_string();
            cargo(
                "smoke run",
                &["run", "-p", "outrun-cli", "--", "simulate", "--frames", &frames],
            )?;
        }
    }

    Ok(())
}
