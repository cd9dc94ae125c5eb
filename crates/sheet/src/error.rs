#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    #[error("sheet request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("sheet rejected {action}: {message}")]
    Rejected {
        action: &'static str,
        message: String,
    },

    #[error("invalid sheet url `{0}`")]
    InvalidUrl(String),
}

pub type Result<T> = std::result::Result<T, SheetError>;

/// Why a positional row could not become a typed record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    #[error("not a data row")]
    NotData,

    #[error("missing column `{0}`")]
    Missing(&'static str),

    #[error("column `{column}` has invalid value `{value}`")]
    Invalid {
        column: &'static str,
        value: String,
    },
}
