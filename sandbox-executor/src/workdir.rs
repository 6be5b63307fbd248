//! The per-job work directory: `/tmp/judge/<uuid>/`, created on job start
//! and removed before the job returns regardless of success or error.

use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Default base directory for per-job work directories, matching the
/// filesystem layout in spec §6 (`/tmp/code_manager/<uuid>/` there; this
/// workspace's own default is `/tmp/judge/<uuid>/`).
pub const DEFAULT_BASE_DIR: &str = "/tmp/judge";

/// An RAII guard over a job's work directory. `Drop` is a best-effort
/// backstop that removes the directory synchronously and logs (never
/// panics) on failure; callers that want removal errors surfaced should
/// call [`WorkDir::finish`] before letting the guard drop.
pub struct WorkDir {
    path: PathBuf,
    finished: bool,
}

impl WorkDir {
    /// Creates a fresh, empty work directory under `base_dir`.
    pub async fn create(base_dir: &Path) -> std::io::Result<Self> {
        let path = base_dir.join(Uuid::new_v4().to_string());
        tokio::fs::create_dir_all(&path).await?;
        Ok(Self {
            path,
            finished: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn path_str(&self) -> String {
        self.path.to_string_lossy().to_string()
    }

    /// Removes the directory and surfaces any I/O error to the caller.
    /// After this returns (success or error), `Drop` is a no-op.
    pub async fn finish(mut self) -> std::io::Result<()> {
        let result = tokio::fs::remove_dir_all(&self.path).await;
        self.finished = true;
        match result {
            Ok(()) => Ok(()),
            // Already gone is not a failure from the caller's perspective.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to clean up work directory");
            }
        }
    }
}
