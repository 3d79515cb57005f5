use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use std::ffi::OsString;
use std::fmt;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::NamedTempFile;

use super::github::ReleaseSource;
use super::UpgradeError;

/// How the staged installer script gets executed.
#[derive(Debug, Clone, PartialEq)]
pub struct InstallerSettings {
    /// Variable that carries the resolved tag into the script
    pub version_env: String,
    /// Elevation program; empty runs the shell directly
    pub elevate: String,
    pub shell: String,
    pub script_mode: u32,
    /// Directory for the staged script; the system temp dir when unset
    pub staging_dir: Option<PathBuf>,
}

impl Default for InstallerSettings {
    fn default() -> Self {
        Self {
            version_env: "CLAB_VERSION".to_string(),
            elevate: "sudo".to_string(),
            shell: "bash".to_string(),
            script_mode: 0o755,
            staging_dir: None,
        }
    }
}

impl InstallerSettings {
    /// Describe `<elevate> <shell> <script>` with the tag injected on top of the inherited env
    pub fn invocation(&self, script: &Path, tag: &str) -> Invocation {
        let (program, mut args) = if self.elevate.is_empty() {
            (self.shell.clone(), Vec::new())
        } else {
            (self.elevate.clone(), vec![OsString::from(&self.shell)])
        };
        args.push(script.as_os_str().to_owned());

        Invocation {
            program,
            args,
            env: vec![(self.version_env.clone(), tag.to_string())],
        }
    }
}

/// A process to run with elevated rights. Stdout and stderr go to the console.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<OsString>,
    /// Added to the current environment, never replacing it
    pub env: Vec<(String, String)>,
}

impl Invocation {
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .envs(self.env.iter().map(|(k, v)| (k, v)))
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        cmd
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Runs an invocation with elevated rights and waits for it to exit.
pub trait PrivilegedRunner {
    fn run(&self, invocation: &Invocation) -> Result<(), UpgradeError>;
}

/// Spawns the real process; elevation happens through the invoked program (sudo).
pub struct ElevatedRunner;

impl PrivilegedRunner for ElevatedRunner {
    fn run(&self, invocation: &Invocation) -> Result<(), UpgradeError> {
        let status = invocation
            .command()
            .status()
            .map_err(|source| UpgradeError::SubprocessLaunch {
                command: invocation.to_string(),
                source,
            })?;

        if !status.success() {
            return Err(UpgradeError::SubprocessExit {
                command: invocation.to_string(),
                status,
            });
        }

        Ok(())
    }
}

/// Stage the installer script and run it for `tag`.
/// The staged file is removed when this returns, whatever the outcome.
pub fn perform_upgrade(
    source: &dyn ReleaseSource,
    runner: &dyn PrivilegedRunner,
    settings: &InstallerSettings,
    tag: &str,
) -> Result<(), UpgradeError> {
    let script = stage_script(source, settings.script_mode, settings.staging_dir.as_deref())?;

    let invocation = settings.invocation(script.path(), tag);
    debug!("running installer: {} ({}={})", invocation, settings.version_env, tag);

    runner.run(&invocation)
}

/// Download the installer into a fresh temp file, rewound and executable.
pub fn stage_script(
    source: &dyn ReleaseSource,
    mode: u32,
    dir: Option<&Path>,
) -> Result<NamedTempFile, UpgradeError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("clab");
    let mut script = match dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    }
    .map_err(UpgradeError::TempFile)?;
    debug!("staging installer at {}", script.path().display());

    let written = download_script(source, script.as_file_mut())?;
    debug!("downloaded {} bytes", written);

    set_mode(script.as_file(), mode)?;

    Ok(script)
}

fn download_script(source: &dyn ReleaseSource, file: &mut File) -> Result<u64, UpgradeError> {
    let mut download = source.open_installer()?;

    let pb = match download.len {
        Some(len) => ProgressBar::new(len),
        None => ProgressBar::new_spinner(),
    };
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let mut written: u64 = 0;
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = download
            .reader
            .read(&mut buffer)
            .map_err(|e| UpgradeError::network(&download.url, e))?;
        if bytes_read == 0 {
            break;
        }
        file.write_all(&buffer[..bytes_read])
            .map_err(UpgradeError::Write)?;
        written += bytes_read as u64;
        pb.set_position(written);
    }
    pb.finish_and_clear();

    file.flush().map_err(UpgradeError::Write)?;
    file.seek(SeekFrom::Start(0)).map_err(UpgradeError::Seek)?;

    Ok(written)
}

#[cfg(unix)]
fn set_mode(file: &File, mode: u32) -> Result<(), UpgradeError> {
    use std::fs::Permissions;
    use std::os::unix::fs::PermissionsExt;

    file.set_permissions(Permissions::from_mode(mode))
        .map_err(UpgradeError::Permission)
}

#[cfg(not(unix))]
fn set_mode(_file: &File, _mode: u32) -> Result<(), UpgradeError> {
    Ok(())
}
