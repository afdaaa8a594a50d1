//! Certificate-file existence probes.
//!
//! Probes are read-only and independent, so they run concurrently on a
//! [`JoinSet`] bounded by a semaphore. Results are indexed by input position;
//! callers always see them in declared order regardless of completion order.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Why a probe could not give a yes/no answer.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("failed to stat {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("probe task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Whether `fingerprint` can name a file directly inside the certificates
/// directory.
pub fn is_plain_fingerprint(fingerprint: &str) -> bool {
    !fingerprint.is_empty()
        && fingerprint != "."
        && fingerprint != ".."
        && !fingerprint.contains(['/', '\\'])
}

/// Check which of `paths` are existing regular files.
///
/// At most `limit` probes are in flight at once. The returned vector has one
/// entry per input path, in input order.
pub async fn probe_files(paths: &[PathBuf], limit: usize) -> Result<Vec<bool>, ProbeError> {
    let permits = Arc::new(Semaphore::new(limit.max(1)));
    let mut probes = JoinSet::new();
    for (index, path) in paths.iter().cloned().enumerate() {
        let permits = Arc::clone(&permits);
        probes.spawn(async move {
            let _permit = permits.acquire_owned().await.ok();
            let found = match tokio::fs::metadata(&path).await {
                Ok(metadata) => Ok(metadata.is_file()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
                Err(source) => Err(ProbeError::Io { path, source }),
            };
            (index, found)
        });
    }

    let mut present = vec![false; paths.len()];
    while let Some(joined) = probes.join_next().await {
        let (index, found) = joined?;
        present[index] = found?;
    }
    Ok(present)
}
