use std::fmt;

/// Why a response was passed through uncompressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BypassReason {
    /// The application set the compression override to false.
    Disabled,
    /// The body is deferred and cannot be buffered yet.
    AsyncBody,
    /// The client did not advertise gzip support.
    NotAccepted,
    /// The response already carries a Content-Encoding.
    AlreadyEncoded,
    /// The Content-Type is missing or not worth compressing.
    UncompressibleType(Option<String>),
}

impl fmt::Display for BypassReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BypassReason::Disabled => f.write_str("compression disabled by the application"),
            BypassReason::AsyncBody => f.write_str("cannot compress asynchronous responses"),
            BypassReason::NotAccepted => f.write_str("client does not accept gzip"),
            BypassReason::AlreadyEncoded => f.write_str("content encoding already defined"),
            BypassReason::UncompressibleType(Some(ct)) => {
                write!(f, "uncompressible content type {ct}")
            }
            BypassReason::UncompressibleType(None) => f.write_str("no content type"),
        }
    }
}

/// What an egress compression filter did with a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The response was returned unchanged.
    Bypass(BypassReason),
    /// The body was gzip-compressed.
    Compressed {
        /// Content-Length declared by the application, if any.
        original_length: Option<u64>,
        /// Length of the gzip stream.
        compressed_length: u64,
    },
}

impl Decision {
    /// Returns true when compression made the body larger than declared.
    pub fn inflated(&self) -> bool {
        match self {
            Decision::Compressed {
                original_length: Some(original),
                compressed_length,
            } => compressed_length > original,
            _ => false,
        }
    }

    /// Bytes saved against the declared Content-Length; negative when inflated.
    pub fn savings(&self) -> Option<i128> {
        match self {
            Decision::Compressed {
                original_length: Some(original),
                compressed_length,
            } => Some(i128::from(*original) - i128::from(*compressed_length)),
            _ => None,
        }
    }
}

/// Receives the filter's decisions.
///
/// Decisions are diagnostics only; a sink cannot alter the response.
pub trait DecisionLog: Send + Sync {
    /// Records one decision.
    fn record(&self, decision: &Decision);
}

/// Writes decisions to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl DecisionLog for TracingLog {
    fn record(&self, decision: &Decision) {
        match decision {
            Decision::Bypass(reason) => {
                tracing::debug!(%reason, "returning original response");
            }
            Decision::Compressed {
                original_length: Some(original),
                compressed_length,
            } => {
                let savings = decision.savings();
                let ratio = compressed_length.saturating_mul(100) / (*original).max(1);
                tracing::debug!(
                    content_length = original,
                    compressed = compressed_length,
                    savings = savings.unwrap_or_default(),
                    ratio_percent = ratio,
                    "compressed response"
                );
                if decision.inflated() {
                    tracing::warn!(
                        content_length = original,
                        compressed = compressed_length,
                        "compression increased size of response"
                    );
                }
            }
            Decision::Compressed {
                original_length: None,
                compressed_length,
            } => {
                tracing::debug!(compressed = compressed_length, "compressed response");
            }
        }
    }
}

impl<F> DecisionLog for F
where
    F: Fn(&Decision) + Send + Sync,
{
    fn record(&self, decision: &Decision) {
        self(decision)
    }
}
