use thiserror::Error;

/// Failures raised while resolving a filer's 13F-HR filings.
#[derive(Debug, Error)]
pub enum EdgarError {
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("failed to parse {document}: {reason}")]
    Parse {
        document: &'static str,
        reason: String,
    },

    #[error("{document} is missing required field `{field}`")]
    MissingField {
        document: &'static str,
        field: String,
    },

    #[error("{document} field `{field}` is not a non-negative integer: {value:?}")]
    InvalidInteger {
        document: &'static str,
        field: String,
        value: String,
    },

    #[error("expected more than {required} .xml links on {url}, found {found}")]
    LinkDiscovery {
        url: String,
        found: usize,
        required: usize,
    },
}

impl EdgarError {
    pub(crate) fn parse(document: &'static str, reason: impl ToString) -> Self {
        EdgarError::Parse {
            document,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn missing(document: &'static str, field: impl Into<String>) -> Self {
        EdgarError::MissingField {
            document,
            field: field.into(),
        }
    }

    /// Stable name of the failure class, used in run reports.
    pub fn category(&self) -> &'static str {
        match self {
            EdgarError::Transport { .. } => "transport",
            EdgarError::Parse { .. } => "parse",
            EdgarError::MissingField { .. } | EdgarError::InvalidInteger { .. } => "schema",
            EdgarError::LinkDiscovery { .. } => "link-discovery",
        }
    }
}

pub type Result<T> = std::result::Result<T, EdgarError>;
