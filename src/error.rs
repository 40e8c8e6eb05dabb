/// Errors surfaced by the view engine
///
/// Only construction and configuration loading fail with an `Err`; every
/// interaction-time problem is clamped or ignored.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("no spectra to display")]
    NoSpectra,

    #[error("spectrum '{0}' has no data points")]
    EmptySpectrum(String),

    #[error("spectrum '{other}' cannot share an X scale with '{first}'")]
    ScalesIncompatible { first: String, other: String },

    #[error("spectrum index {0} out of range")]
    SpectrumIndex(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ViewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let e = ViewError::ScalesIncompatible {
            first: "1H".into(),
            other: "IR".into(),
        };
        assert_eq!(e.to_string(), "spectrum 'IR' cannot share an X scale with '1H'");
        assert_eq!(ViewError::SpectrumIndex(4).to_string(), "spectrum index 4 out of range");
    }
}
