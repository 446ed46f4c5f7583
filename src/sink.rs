//! Framed JSON file writer for one station's output file.
//!
//! The file is wrapped in literal framing bytes: `{"data": [` + newline at
//! open, `]}` at close, with one tab-indented compact record per line in
//! between. Every operation is an independent open/write/close cycle; no
//! handle is held across calls. The last record's trailing comma is kept in
//! front of the closing bytes — downstream consumers parse this exact shape.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::report::PositionRecord;

/// Literal bytes opening the array wrapper.
pub const OPEN_FRAME: &[u8] = b"{\"data\": [\n";

/// Literal bytes closing the array wrapper.
pub const CLOSE_FRAME: &[u8] = b"]}";

/// Errors that can occur while writing the output file
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Append/frame-open/frame-close operations against one output file.
pub struct RecordSink {
    path: PathBuf,
}

impl RecordSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Truncate-create the file and write the opening framing bytes.
    pub async fn open_frame(&self) -> Result<(), SinkError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|source| self.io_error(source))?;
            }
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .await
            .map_err(|source| self.io_error(source))?;
        file.write_all(OPEN_FRAME)
            .await
            .map_err(|source| self.io_error(source))?;
        file.flush().await.map_err(|source| self.io_error(source))
    }

    /// Append one record line: tab, compact JSON, trailing comma, newline.
    pub async fn append(&self, record: &PositionRecord) -> Result<(), SinkError> {
        let json = serde_json::to_string(record)?;
        let mut line = Vec::with_capacity(json.len() + 3);
        line.push(b'\t');
        line.extend_from_slice(json.as_bytes());
        line.extend_from_slice(b",\n");
        self.append_bytes(&line).await
    }

    /// Append the closing framing bytes. The preceding record's trailing
    /// comma is deliberately left in place.
    pub async fn close_frame(&self) -> Result<(), SinkError> {
        self.append_bytes(CLOSE_FRAME).await
    }

    async fn append_bytes(&self, bytes: &[u8]) -> Result<(), SinkError> {
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .await
            .map_err(|source| self.io_error(source))?;
        file.write_all(bytes)
            .await
            .map_err(|source| self.io_error(source))?;
        file.flush().await.map_err(|source| self.io_error(source))
    }

    fn io_error(&self, source: std::io::Error) -> SinkError {
        SinkError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn sample_record() -> PositionRecord {
        PositionRecord {
            stid: json!("ATL001"),
            seq_num: json!(7),
            latitude: json!(33.64),
            longitude: json!(-84.43),
            time: json!("2021-06-01T12:00:00Z"),
        }
    }

    #[tokio::test]
    async fn framing_round_trip_with_one_record() {
        let dir = tempdir().unwrap();
        let sink = RecordSink::new(dir.path().join("flight_data_atl.json"));

        sink.open_frame().await.unwrap();
        sink.append(&sample_record()).await.unwrap();
        sink.close_frame().await.unwrap();

        let content = tokio::fs::read_to_string(sink.path()).await.unwrap();
        assert_eq!(
            content,
            "{\"data\": [\n\t{\"stid\":\"ATL001\",\"seqNum\":7,\"latitude\":33.64,\"longitude\":-84.43,\"time\":\"2021-06-01T12:00:00Z\"},\n]}"
        );
    }

    #[tokio::test]
    async fn empty_run_produces_framing_only() {
        let dir = tempdir().unwrap();
        let sink = RecordSink::new(dir.path().join("flight_data_clt.json"));

        sink.open_frame().await.unwrap();
        sink.close_frame().await.unwrap();

        let content = tokio::fs::read_to_string(sink.path()).await.unwrap();
        assert_eq!(content, "{\"data\": [\n]}");
    }

    #[tokio::test]
    async fn open_frame_truncates_previous_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("flight_data_atl.json");
        tokio::fs::write(&path, "stale").await.unwrap();

        let sink = RecordSink::new(&path);
        sink.open_frame().await.unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(content.as_bytes(), OPEN_FRAME);
    }

    #[tokio::test]
    async fn open_frame_creates_missing_data_dir() {
        let dir = tempdir().unwrap();
        let sink = RecordSink::new(dir.path().join("data").join("flight_data_atl.json"));

        sink.open_frame().await.unwrap();
        assert!(sink.path().exists());
    }
}
