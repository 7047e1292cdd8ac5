//! Parallel, all-or-nothing batch loading.
//!
//! Every file of a batch is read and parsed on tokio's blocking pool. The
//! batch resolves once all files are done; the first failure aborts the
//! outstanding reads and fails the whole batch.

use std::path::PathBuf;

use serde_json::Value;
use tokio::task::JoinSet;
use tracing::{debug, warn};
use wrapped_core::error::{Result, WrappedError};
use wrapped_data::reader::read_payload;

/// Read and parse every file in `paths` concurrently.
///
/// Payloads are returned in input order regardless of completion order.
pub async fn load_batch(paths: Vec<PathBuf>) -> Result<Vec<Value>> {
    if paths.is_empty() {
        return Err(WrappedError::NoInput);
    }

    let started = std::time::Instant::now();
    let total = paths.len();
    let mut tasks = JoinSet::new();

    for (index, path) in paths.into_iter().enumerate() {
        tasks.spawn_blocking(move || (index, read_payload(&path)));
    }

    let mut slots: Vec<Option<Value>> = vec![None; total];

    while let Some(joined) = tasks.join_next().await {
        let (index, outcome) = joined.map_err(|e| WrappedError::Io(e.into()))?;
        match outcome {
            Ok(value) => slots[index] = Some(value),
            Err(e) => {
                warn!(error = %e, "batch load failed; discarding {} file(s)", total);
                tasks.abort_all();
                return Err(e);
            }
        }
    }

    let payloads: Vec<Value> = slots.into_iter().flatten().collect();
    debug!(
        files = payloads.len(),
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "batch loaded"
    );
    Ok(payloads)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_load_batch_preserves_input_order() {
        let dir = TempDir::new().unwrap();
        let paths: Vec<PathBuf> = (0..8)
            .map(|i| write_file(dir.path(), &format!("part{i}.json"), &format!("[{i}]")))
            .collect();

        let payloads = load_batch(paths).await.unwrap();
        let firsts: Vec<i64> = payloads.iter().map(|v| v[0].as_i64().unwrap()).collect();
        assert_eq!(firsts, (0..8).collect::<Vec<i64>>());
    }

    #[tokio::test]
    async fn test_load_batch_single_bad_file_fails_batch() {
        let dir = TempDir::new().unwrap();
        let good = write_file(dir.path(), "good.json", "[]");
        let bad = write_file(dir.path(), "bad.json", "[{");

        let err = load_batch(vec![good, bad.clone()]).await.unwrap_err();
        match err {
            WrappedError::Parse { path, .. } => assert_eq!(path, bad),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_load_batch_missing_file() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("gone.json");
        assert!(matches!(
            load_batch(vec![missing]).await.unwrap_err(),
            WrappedError::FileRead { .. }
        ));
    }

    #[tokio::test]
    async fn test_load_batch_empty_is_no_input() {
        assert!(matches!(
            load_batch(Vec::new()).await.unwrap_err(),
            WrappedError::NoInput
        ));
    }
}
