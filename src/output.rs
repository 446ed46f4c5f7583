//! Entry-point seam between the message transport and the sinks.
//!
//! Whatever transport delivers messages (the bundled binary adapts stdin;
//! production deployments call in from their own connection handling) hands
//! each one to an [`Output`] implementation together with its routing header.
//! The call never blocks.

use std::sync::Arc;

/// Text-normalization step applied to a message before it is stored.
///
/// Injected so deployments can plug in their own conversion; the default is
/// the identity function.
pub type ConvertFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// The default no-op conversion.
pub fn identity_convert() -> ConvertFn {
    Arc::new(|text: &str| text.to_string())
}

/// Sink for inbound messages, invoked once per message.
pub trait Output: Send + Sync {
    fn output(&self, message: &str, header: &str);
}

/// Build the stored entry text for a message: the converted message,
/// prefixed with the raw header when the `headers` option is set.
pub(crate) fn compose_entry(
    message: &str,
    header: &str,
    prepend_headers: bool,
    convert: &ConvertFn,
) -> String {
    let converted = convert(message);
    if prepend_headers {
        format!("{header}{converted}")
    } else {
        converted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_is_converted_message_by_default() {
        let convert = identity_convert();
        assert_eq!(compose_entry("body", "hdr|", false, &convert), "body");
    }

    #[test]
    fn headers_option_prepends_raw_header() {
        let convert = identity_convert();
        assert_eq!(compose_entry("body", "hdr|", true, &convert), "hdr|body");
    }

    #[test]
    fn convert_runs_before_header_prefixing() {
        let convert: ConvertFn = Arc::new(|text: &str| text.to_uppercase());
        assert_eq!(compose_entry("body", "hdr|", true, &convert), "hdr|BODY");
    }
}
