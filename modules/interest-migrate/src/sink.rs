// Filesystem quarantine sink.
//
// `put` only enqueues: a background task owns the directory and writes each
// entry to `<dir>/<name>.json`. The transformer never waits on disk I/O.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use interest_transform::QuarantineSink;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

struct PendingEntry {
    name: String,
    content: Vec<u8>,
}

/// Counts reported by the writer task once the channel is drained.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WriterStats {
    pub written: u64,
    pub failed: u64,
}

/// Sending half, handed to the transformer.
pub struct DirQuarantineSink {
    tx: mpsc::UnboundedSender<PendingEntry>,
}

/// Handle to the background writer.
pub struct QuarantineWriter {
    handle: JoinHandle<WriterStats>,
}

impl DirQuarantineSink {
    /// Create `dir` if needed and start the writer task.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<(Self, QuarantineWriter)> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("creating quarantine dir {}", dir.display()))?;

        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(write_entries(dir, rx));
        Ok((Self { tx }, QuarantineWriter { handle }))
    }
}

impl QuarantineSink for DirQuarantineSink {
    fn put(&self, name: &str, content: Vec<u8>) {
        let entry = PendingEntry {
            name: name.to_string(),
            content,
        };
        if self.tx.send(entry).is_err() {
            tracing::warn!(entry_name = name, "Quarantine writer has stopped, dropping entry");
        }
    }
}

impl QuarantineWriter {
    /// Wait for every queued entry to be written. All sinks must be dropped
    /// first, otherwise this never returns.
    pub async fn finish(self) -> Result<WriterStats> {
        self.handle.await.context("quarantine writer task panicked")
    }
}

async fn write_entries(dir: PathBuf, mut rx: mpsc::UnboundedReceiver<PendingEntry>) -> WriterStats {
    let mut stats = WriterStats::default();
    while let Some(entry) = rx.recv().await {
        let path = dir.join(file_name(&entry.name));
        match write_once(&path, &entry.content).await {
            Ok(()) => stats.written += 1,
            Err(e) => {
                stats.failed += 1;
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to write quarantine entry"
                );
            }
        }
    }
    stats
}

/// Entry names embed the raw userId; path separators must not leave `dir`.
fn file_name(name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("{safe}.json")
}

/// Write-once: an existing file with the same name is never overwritten.
async fn write_once(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(content).await?;
    file.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_each_entry_to_its_own_file() {
        let dir = tempfile::tempdir().unwrap();
        let (sink, writer) = DirQuarantineSink::open(dir.path().join("q")).await.unwrap();

        sink.put("Exception_Encode_U_a-1_x", b"{\"a\":1}".to_vec());
        sink.put("TransformationFailure_WeatherNoLatOrLon_U_a-1_y", b"{}".to_vec());
        drop(sink);

        let stats = writer.finish().await.unwrap();
        assert_eq!(stats, WriterStats { written: 2, failed: 0 });

        let content = std::fs::read(dir.path().join("q/Exception_Encode_U_a-1_x.json")).unwrap();
        assert_eq!(content, b"{\"a\":1}");
        assert!(dir
            .path()
            .join("q/TransformationFailure_WeatherNoLatOrLon_U_a-1_y.json")
            .exists());
    }

    #[test]
    fn file_name_replaces_path_separators() {
        assert_eq!(file_name("Exception_Encode_U_a-1_x"), "Exception_Encode_U_a-1_x.json");
        assert_eq!(
            file_name("Exception_Encode_U_a-../a\\b_x"),
            "Exception_Encode_U_a-.._a_b_x.json"
        );
    }

    #[tokio::test]
    async fn user_ids_with_slashes_stay_inside_the_dir() {
        let dir = tempfile::tempdir().unwrap();
        let (sink, writer) = DirQuarantineSink::open(dir.path()).await.unwrap();

        sink.put("TransformationFailure_WeatherNoLatOrLon_U_a-a/b_y", b"{}".to_vec());
        drop(sink);

        let stats = writer.finish().await.unwrap();
        assert_eq!(stats, WriterStats { written: 1, failed: 0 });
        assert!(dir
            .path()
            .join("TransformationFailure_WeatherNoLatOrLon_U_a-a_b_y.json")
            .exists());
    }

    #[tokio::test]
    async fn existing_entries_are_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("dup.json"), b"original").unwrap();

        let (sink, writer) = DirQuarantineSink::open(dir.path()).await.unwrap();
        sink.put("dup", b"replacement".to_vec());
        drop(sink);

        let stats = writer.finish().await.unwrap();
        assert_eq!(stats, WriterStats { written: 0, failed: 1 });
        assert_eq!(std::fs::read(dir.path().join("dup.json")).unwrap(), b"original");
    }
}
