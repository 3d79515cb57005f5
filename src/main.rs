use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use clab::Config;

#[derive(Parser, Debug)]
#[command(name = "clab")]
#[command(about = "Container-based network lab tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Path to config file (defaults to <config dir>/clab/config.toml)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show version information
    Version {
        #[command(subcommand)]
        action: Option<VersionCommand>,
    },
}

#[derive(Subcommand, Debug)]
enum VersionCommand {
    /// Upgrade clab to the latest available version
    Upgrade,

    /// Check whether a newer version is published
    Check,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Command::Version { action: None } => run_version_command(),
        Command::Version {
            action: Some(VersionCommand::Upgrade),
        } => run_upgrade_command(&config),
        Command::Version {
            action: Some(VersionCommand::Check),
        } => run_check_command(&config),
    }
}

fn init_logging(debug: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.try_init().ok();
}

fn run_version_command() -> Result<()> {
    use colored::Colorize;

    println!("{} {}", "clab".bold(), clab::upgrade::CURRENT_VERSION);
    Ok(())
}

fn run_upgrade_command(config: &Config) -> Result<()> {
    clab::privilege::ensure_root()?;
    clab::perform_update(config)
}

fn run_check_command(config: &Config) -> Result<()> {
    use clab::upgrade::{self, GithubSource};
    use colored::Colorize;

    let source = GithubSource::new(&config.tags_url, &config.installer_url)?;

    match upgrade::check_for_update(&source)? {
        Some(tag) => {
            println!(
                "{} New version available: {} → {}",
                "↑".yellow(),
                upgrade::CURRENT_VERSION.dimmed(),
                tag.green()
            );
            println!("  Run `sudo clab version upgrade` to install");
        }
        None => {
            println!(
                "{} You're running the latest version ({})",
                "✓".green(),
                upgrade::CURRENT_VERSION
            );
        }
    }
    Ok(())
}
