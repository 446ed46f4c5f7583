//! Single-stream fallback sink: every message appended to one log file.
//!
//! No routing, no buffering, no window. Used when the deployment only wants
//! a raw capture of the feed.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use tracing::{error, info};

use crate::output::{compose_entry, ConvertFn, Output};

/// Default path of the fallback message log.
pub const DEFAULT_LOG_PATH: &str = "log/messages.log";

/// Appends each message as one line to a log file, also echoing it through
/// the tracing channel. Write failures are logged and the line is lost.
pub struct LogFileOutput {
    path: PathBuf,
    prepend_headers: bool,
    convert: ConvertFn,
}

impl LogFileOutput {
    pub fn new(path: impl Into<PathBuf>, prepend_headers: bool, convert: ConvertFn) -> Self {
        Self {
            path: path.into(),
            prepend_headers,
            convert,
        }
    }

    fn append_line(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")
    }
}

impl Output for LogFileOutput {
    fn output(&self, message: &str, header: &str) {
        let line = compose_entry(message, header, self.prepend_headers, &self.convert);
        info!(target: "messages", "{line}");
        if let Err(e) = self.append_line(&line) {
            error!(path = %self.path.display(), error = %e, "error writing to message log");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::identity_convert;
    use tempfile::tempdir;

    #[test]
    fn appends_one_line_per_message() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("messages.log");
        let output = LogFileOutput::new(&path, false, identity_convert());

        output.output("first", "h1");
        output.output("second", "h2");

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }

    #[test]
    fn headers_option_applies_to_logged_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("messages.log");
        let output = LogFileOutput::new(&path, true, identity_convert());

        output.output("body", "hdr|");

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "hdr|body\n");
    }

    #[test]
    fn creates_missing_log_dir() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log").join("messages.log");
        let output = LogFileOutput::new(&path, false, identity_convert());

        output.output("line", "");

        assert!(path.exists());
    }
}
