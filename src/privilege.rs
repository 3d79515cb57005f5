use anyhow::{anyhow, bail, Context, Result};
use std::process::Command;

/// Fail unless running with an effective uid of 0
pub fn ensure_root() -> Result<()> {
    let uid = effective_uid()?;
    check_uid(uid)
}

fn effective_uid() -> Result<u32> {
    let output = Command::new("id")
        .arg("-u")
        .output()
        .context("Failed to run `id -u`")?;

    if !output.status.success() {
        return Err(anyhow!("`id -u` exited with {}", output.status));
    }

    parse_uid(&String::from_utf8_lossy(&output.stdout))
}

fn parse_uid(stdout: &str) -> Result<u32> {
    stdout
        .trim()
        .parse()
        .with_context(|| format!("Unexpected `id -u` output: {:?}", stdout.trim()))
}

fn check_uid(uid: u32) -> Result<()> {
    if uid != 0 {
        bail!("this command requires root privileges, please run it with sudo");
    }
    Ok(())
}
