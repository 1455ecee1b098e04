//! Error type shared by every panel-construction and maintenance operation.
//!
//! All variants are fatal for the operation that produced them: they point at a
//! broken panel definition rather than a transient condition, so nothing in this
//! crate retries. Soft warnings (a duplicate logger name) are not errors; see
//! [`crate::logger::Logger::add_logger`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GuiError {
    /// A builder tried to register an id that is already present.
    #[error("control id `{0}` is already registered")]
    DuplicateControl(String),

    /// An operation referred to an id the registry does not know.
    #[error("no control is registered with id `{0}`")]
    UnknownControl(String),

    /// The mounted document has no element for a registered id.
    #[error("no element with id `{0}` in the mounted document")]
    ElementNotFound(String),

    #[error("reactive path is empty")]
    EmptyPath,

    #[error("reactive path `{path}`: segment `{segment}` does not exist")]
    PathSegmentMissing { path: String, segment: String },

    /// A non-terminal segment resolved to a scalar (or null).
    #[error("reactive path `{path}`: segment `{segment}` is not a record")]
    PathNotComposite { path: String, segment: String },

    /// The terminal segment resolved to a record, array or null.
    #[error("reactive path `{path}` does not end on a scalar")]
    PathNotScalar { path: String },

    #[error("stats panel index {index} is out of range ({count} panels)")]
    PanelOutOfRange { index: isize, count: usize },

    /// A selector produced a value that is not a panel index.
    #[error("stats selection `{0}` is not a panel index")]
    InvalidSelection(String),

    #[error("no logger named `{0}`")]
    UnknownLogger(String),

    /// The host environment rejected a DOM or canvas operation.
    #[error("host: {0}")]
    Host(String),

    #[error("config: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T, E = GuiError> = std::result::Result<T, E>;

impl GuiError {
    pub fn host(msg: impl Into<String>) -> Self {
        GuiError::Host(msg.into())
    }

    /// Text suitable for a blocking user-visible alert.
    pub fn alert_text(&self) -> String {
        format!("apg_gui: {self}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let e = GuiError::DuplicateControl("speed".into());
        assert_eq!(e.to_string(), "control id `speed` is already registered");

        let e = GuiError::PathNotComposite {
            path: "body.pos.x".into(),
            segment: "pos".into(),
        };
        assert!(e.to_string().contains("`pos`"));
        assert!(e.alert_text().starts_with("apg_gui: "));
    }

    #[test]
    fn json_errors_convert() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let e: GuiError = err.into();
        assert!(matches!(e, GuiError::Config(_)));
    }
}
