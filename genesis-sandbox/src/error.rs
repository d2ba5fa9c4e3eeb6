use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SandboxError {
    /// The sandbox workspace could not be created or is not a directory.
    /// Callers must not fall back to the unsandboxed workspace.
    #[error("failed to provision sandbox workspace {}", path.display())]
    Provision {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
