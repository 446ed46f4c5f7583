//! Classification of inbound messages onto per-station buffers.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::buffer::PriorityBuffer;
use crate::output::{compose_entry, ConvertFn, Output};

/// One routing target: a station marker and the buffer it feeds.
pub struct Route {
    code: String,
    marker: String,
    buffer: Arc<PriorityBuffer>,
}

impl Route {
    pub fn new(code: impl Into<String>, marker: impl Into<String>, buffer: Arc<PriorityBuffer>) -> Self {
        Self {
            code: code.into(),
            marker: marker.into(),
            buffer,
        }
    }
}

/// Routes each inbound message to the buffer of the first station whose
/// marker appears in the message or its header.
///
/// Routes are checked in configured order, so a message matching several
/// markers lands on the earliest one — a tie-break, not an error. A message
/// matching none is dropped with a diagnostic and never retried.
pub struct Router {
    routes: Vec<Route>,
    prepend_headers: bool,
    convert: ConvertFn,
}

impl Router {
    pub fn new(routes: Vec<Route>, prepend_headers: bool, convert: ConvertFn) -> Self {
        Self {
            routes,
            prepend_headers,
            convert,
        }
    }

    /// Classify and enqueue one message. Never blocks.
    pub fn route(&self, message: &str, header: &str) {
        let matched = self
            .routes
            .iter()
            .find(|route| message.contains(&route.marker) || header.contains(&route.marker));

        match matched {
            Some(route) => {
                let entry = compose_entry(message, header, self.prepend_headers, &self.convert);
                debug!(station = %route.code, bytes = entry.len(), "message enqueued");
                route.buffer.add(entry);
            }
            None => {
                warn!(header, "no station marker matched; dropping message");
            }
        }
    }
}

impl Output for Router {
    fn output(&self, message: &str, header: &str) {
        self.route(message, header);
    }
}
