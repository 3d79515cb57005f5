pub mod error;
pub mod github;
pub mod installer;
pub mod version;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::config::Config;

pub use error::UpgradeError;
pub use github::{GithubSource, ReleaseSource, Tag};
pub use installer::{ElevatedRunner, InstallerSettings, Invocation, PrivilegedRunner};
pub use version::CURRENT_VERSION;

/// Fetch the tag listing and return the highest release tag, e.g. `v0.55.0`
pub fn resolve_latest_version(source: &dyn ReleaseSource) -> Result<String, UpgradeError> {
    let tags = source.fetch_tags()?;
    let latest = version::latest_tag(tags.iter().map(|t| t.name.as_str()))?;
    Ok(latest.to_string())
}

/// Check for updates and return the newer tag if one is published
pub fn check_for_update(source: &dyn ReleaseSource) -> Result<Option<String>> {
    let latest = resolve_latest_version(source).context("failed to determine latest version")?;

    if version::is_newer(&latest, version::current())? {
        Ok(Some(latest))
    } else {
        Ok(None)
    }
}

/// Resolve the latest release and run its installer with elevated rights
pub fn perform_update(config: &Config) -> Result<()> {
    let source = GithubSource::new(&config.tags_url, &config.installer_url)?;
    run_upgrade(&source, &ElevatedRunner, &config.installer_settings())
}

pub fn run_upgrade(
    source: &dyn ReleaseSource,
    runner: &dyn PrivilegedRunner,
    settings: &InstallerSettings,
) -> Result<()> {
    println!("{}", "Checking for the latest release...".cyan());

    let latest = resolve_latest_version(source).context("failed to determine latest version")?;
    println!("Latest tag: {}", latest.green());

    println!("{}", "Running installer...".cyan());
    installer::perform_upgrade(source, runner, settings, &latest).context("upgrade failed")?;

    println!("\n{} Upgraded to {}", "✓".green(), latest.green());

    Ok(())
}
