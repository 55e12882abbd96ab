//! Error taxonomy shared by the pipeline and its adapters.

use thiserror::Error;

/// Errors raised while producing an output directive.
///
/// None of these are fatal to the process: the API layer turns every
/// variant into an error payload on the normal response channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectiveError {
    /// Selection was attempted over an empty or unavailable sample set.
    #[error("Unable to get data point for current time.")]
    NoForecastData,

    /// The forecast source could not be reached or returned a malformed payload.
    #[error("Unable to retrieve forecast: {message}")]
    ForecastFetch { message: String },

    /// The requested operation name is not recognized.
    #[error("Unable to call function.")]
    UnknownRequest { name: String },
}

impl DirectiveError {
    /// Builds a [`DirectiveError::ForecastFetch`] from any displayable cause.
    pub fn fetch(cause: impl std::fmt::Display) -> Self {
        Self::ForecastFetch {
            message: cause.to_string(),
        }
    }
}
