//! Decoding of buffered entries into position-report records.
//!
//! A buffered entry is expected to be a JSON object carrying the surveillance
//! payload under the `ns2:asdexMsg` field. Inside it, `positionReport` may be
//! a single object or a list; each report yields one flattened
//! [`PositionRecord`] with the latitude/longitude pulled up from the nested
//! `position` object. Fields are kept as raw JSON values so whatever shape
//! the feed uses (strings, numbers) survives unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Designated top-level field an entry must carry to be archived.
pub const ENVELOPE_FIELD: &str = "ns2:asdexMsg";

const REPORT_FIELD: &str = "positionReport";

/// Errors that can occur while decoding an entry
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("entry is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("entry has no ns2:asdexMsg envelope field")]
    MissingEnvelope,
}

/// One archived record, in the exact field order written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub stid: Value,
    #[serde(rename = "seqNum")]
    pub seq_num: Value,
    pub latitude: Value,
    pub longitude: Value,
    pub time: Value,
}

impl PositionRecord {
    fn from_report(report: &Value) -> Self {
        let field = |value: Option<&Value>| value.cloned().unwrap_or(Value::Null);
        Self {
            stid: field(report.get("stid")),
            seq_num: field(report.get("seqNum")),
            latitude: field(report.pointer("/position/latitude")),
            longitude: field(report.pointer("/position/longitude")),
            time: field(report.get("time")),
        }
    }
}

/// Decoded structured form of a buffered entry.
pub struct Envelope {
    data: Value,
}

impl Envelope {
    /// Decode an entry and unwrap its envelope field.
    pub fn decode(entry: &str) -> Result<Self, ReportError> {
        let top: Value = serde_json::from_str(entry)?;
        match top.get(ENVELOPE_FIELD) {
            Some(data) => Ok(Self { data: data.clone() }),
            None => Err(ReportError::MissingEnvelope),
        }
    }

    /// Extract the position reports carried by this envelope.
    ///
    /// A list field yields one record per element, a single object yields
    /// one record, anything else yields none.
    pub fn position_records(&self) -> Vec<PositionRecord> {
        match self.data.get(REPORT_FIELD) {
            Some(Value::Array(reports)) => {
                reports.iter().map(PositionRecord::from_report).collect()
            }
            Some(report @ Value::Object(_)) => vec![PositionRecord::from_report(report)],
            _ => Vec::new(),
        }
    }
}
