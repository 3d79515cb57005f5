use anyhow::{anyhow, Result};
use log::debug;
use semver::Version;
use std::cmp::Ordering;

use super::UpgradeError;

/// Current version of the clab binary
pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prefix every release tag carries, e.g. `v0.55.0`
pub const TAG_PREFIX: char = 'v';

/// True if release tag `remote` outranks the bare `current` version.
/// Build metadata does not count.
pub fn is_newer(remote: &str, current: &str) -> Result<bool> {
    let remote_ver = parse_tag(remote).ok_or_else(|| anyhow!("Invalid release tag '{}'", remote))?;
    let current_ver =
        Version::parse(current).map_err(|e| anyhow!("Invalid version '{}': {}", current, e))?;
    Ok(remote_ver.cmp_precedence(&current_ver) == Ordering::Greater)
}

/// Get current binary version
pub fn current() -> &'static str {
    CURRENT_VERSION
}

/// Parse a release tag, or `None` if it is not `v<digit>...` followed by valid semver
pub fn parse_tag(name: &str) -> Option<Version> {
    let rest = name.strip_prefix(TAG_PREFIX)?;
    if !rest.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    Version::parse(rest).ok()
}

/// Pick the tag with the highest precedence. Ties, including versions that
/// differ only in build metadata, keep the earlier tag.
pub fn latest_tag<'a, I>(names: I) -> Result<&'a str, UpgradeError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut latest: Option<(&'a str, Version)> = None;
    let mut inspected = 0;

    for name in names {
        inspected += 1;

        let Some(version) = parse_tag(name) else {
            debug!("skipping tag {:?}: not a release version", name);
            continue;
        };

        let replace = match &latest {
            Some((_, max)) => version.cmp_precedence(max) == Ordering::Greater,
            None => true,
        };
        if replace {
            latest = Some((name, version));
        }
    }

    latest
        .map(|(name, _)| name)
        .ok_or(UpgradeError::NoValidVersion { inspected })
}
