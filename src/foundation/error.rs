pub type MockshotResult<T> = Result<T, MockshotError>;

#[derive(thiserror::Error, Debug)]
pub enum MockshotError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("animation error: {0}")]
    Animation(String),

    /// Export requested without a selected (or known) animation preset.
    #[error("no preset error: {0}")]
    NoPreset(String),

    /// Render target unavailable, or the captured raster could not be produced.
    #[error("capture error: {0}")]
    Capture(String),

    /// The encoder rejected the frame set.
    #[error("encode error: {0}")]
    Encode(String),

    /// A project document was rejected before any state was touched.
    #[error("import validation error: {0}")]
    ImportValidation(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("export cancelled")]
    Cancelled,

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MockshotError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    pub fn no_preset(msg: impl Into<String>) -> Self {
        Self::NoPreset(msg.into())
    }

    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn import(msg: impl Into<String>) -> Self {
        Self::ImportValidation(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for MockshotError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}

impl From<gif::EncodingError> for MockshotError {
    fn from(e: gif::EncodingError) -> Self {
        Self::encode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            MockshotError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(
            MockshotError::no_preset("x")
                .to_string()
                .contains("no preset error:")
        );
        assert!(
            MockshotError::capture("x")
                .to_string()
                .contains("capture error:")
        );
        assert!(
            MockshotError::encode("x")
                .to_string()
                .contains("encode error:")
        );
        assert!(
            MockshotError::import("x")
                .to_string()
                .contains("import validation error:")
        );
        assert_eq!(MockshotError::Cancelled.to_string(), "export cancelled");
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = MockshotError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn json_errors_map_to_serde() {
        let err: MockshotError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, MockshotError::Serde(_)));
    }
}
