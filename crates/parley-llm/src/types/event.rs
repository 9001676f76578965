use serde::{Serialize, Serializer};

/// Client-facing streaming event
///
/// Every upstream stream, whatever its framing quirks, is reduced to these
/// three shapes before it reaches the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedEvent {
    /// Incremental assistant text
    Delta { text: String },
    /// Generation finished; the reason is absent for the upstream sentinel
    Done { finish_reason: Option<String> },
    /// Terminal failure
    Error { message: String },
}

impl NormalizedEvent {
    pub fn delta(text: impl Into<String>) -> Self {
        Self::Delta { text: text.into() }
    }

    pub fn done(finish_reason: Option<&str>) -> Self {
        Self::Done {
            finish_reason: finish_reason.map(str::to_owned),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

/// Wire shape: `{"delta"}`, `{"done", "finish_reason"?}` or `{"error"}`
#[derive(Serialize)]
#[serde(untagged)]
enum WireEvent<'a> {
    Delta {
        delta: &'a str,
    },
    Done {
        done: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        finish_reason: Option<&'a str>,
    },
    Error {
        error: &'a str,
    },
}

impl Serialize for NormalizedEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = match self {
            Self::Delta { text } => WireEvent::Delta { delta: text },
            Self::Done { finish_reason } => WireEvent::Done {
                done: true,
                finish_reason: finish_reason.as_deref(),
            },
            Self::Error { message } => WireEvent::Error { error: message },
        };

        wire.serialize(serializer)
    }
}
