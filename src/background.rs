//! Desktop background integration.
//!
//! Applying a wallpaper is a platform call outside the cache. The
//! [`BackgroundSetter`] trait keeps it swappable; [`DesktopBackground`]
//! shells out to the tool each platform ships with.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::cache::is_unavailable_path;

/// Errors that can occur while applying a background image.
#[derive(thiserror::Error, Debug)]
pub enum BackgroundError {
    /// The image file does not exist.
    #[error("Background image not found: {0}")]
    NotFound(PathBuf),

    /// The platform command could not be started.
    #[error("Failed to run {program}: {source}")]
    Spawn {
        /// Program that was invoked
        program: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The platform command ran but reported failure.
    #[error("{program} exited with status {status}")]
    Failed {
        /// Program that was invoked
        program: String,
        /// Exit status description
        status: String,
    },

    /// No supported mechanism on this platform.
    #[error("Setting the desktop background is not supported on this platform")]
    Unsupported,
}

/// Applies an image file as the desktop background.
pub trait BackgroundSetter {
    /// Apply `path` as the background.
    ///
    /// The [`CacheRecord::UNAVAILABLE`](crate::cache::CacheRecord::UNAVAILABLE)
    /// marker is a no-op returning `Ok(false)`. Returns `Ok(true)` when the
    /// background was changed.
    fn apply(&self, path: &Path) -> Result<bool, BackgroundError>;
}

/// Sets the background through the platform's own tooling.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopBackground;

impl BackgroundSetter for DesktopBackground {
    fn apply(&self, path: &Path) -> Result<bool, BackgroundError> {
        if is_unavailable_path(path) {
            log::debug!("No cached image available, leaving background unchanged");
            return Ok(false);
        }
        if !path.is_file() {
            return Err(BackgroundError::NotFound(path.to_path_buf()));
        }

        let mut command = platform_command(path)?;
        let program = command.get_program().to_string_lossy().into_owned();
        log::info!("Setting desktop background to {}", path.display());

        let status = command.status().map_err(|source| BackgroundError::Spawn {
            program: program.clone(),
            source,
        })?;
        if !status.success() {
            return Err(BackgroundError::Failed {
                program,
                status: status.to_string(),
            });
        }
        Ok(true)
    }
}

#[cfg(target_os = "windows")]
fn platform_command(path: &Path) -> Result<Command, BackgroundError> {
    let script = format!(
        "Add-Type -TypeDefinition 'using System.Runtime.InteropServices; \
         public class W {{ [DllImport(\"user32.dll\", CharSet = CharSet.Unicode)] \
         public static extern int SystemParametersInfo(int a, int b, string c, int d); }}'; \
         [W]::SystemParametersInfo(20, 0, '{}', 3) | Out-Null",
        path.display().to_string().replace('\'', "''")
    );
    let mut command = Command::new("powershell");
    command.args(["-NoProfile", "-NonInteractive", "-Command", &script]);
    Ok(command)
}

#[cfg(target_os = "macos")]
fn platform_command(path: &Path) -> Result<Command, BackgroundError> {
    let script = format!(
        "tell application \"System Events\" to tell every desktop to set picture to \"{}\"",
        path.display().to_string().replace('"', "\\\"")
    );
    let mut command = Command::new("osascript");
    command.args(["-e", &script]);
    Ok(command)
}

#[cfg(all(unix, not(target_os = "macos")))]
fn platform_command(path: &Path) -> Result<Command, BackgroundError> {
    let uri = format!("file://{}", path.display());
    let mut command = Command::new("gsettings");
    command.args(["set", "org.gnome.desktop.background", "picture-uri", &uri]);
    Ok(command)
}

#[cfg(not(any(unix, target_os = "windows")))]
fn platform_command(_path: &Path) -> Result<Command, BackgroundError> {
    Err(BackgroundError::Unsupported)
}
