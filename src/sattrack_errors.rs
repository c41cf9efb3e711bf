use thiserror::Error;

#[derive(Error, Debug)]
pub enum SatTrackError {
    #[error("Invalid element set: {0}")]
    InvalidElementSet(String),

    #[error("SGP4 error: {0}")]
    Sgp4Error(String),

    #[error("Data provider unavailable ({provider}): {reason}")]
    ProviderUnavailable { provider: String, reason: String },

    #[cfg(feature = "noaa-download")]
    #[error("HTTP reqwest error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("Time computation error: {0}")]
    TimeError(#[from] hifitime::HifitimeError),

    #[error("Invalid tracker parameter: {0}")]
    InvalidTrackerParameter(String),

    #[error("Non-finite orbital state for object {0}")]
    NonFiniteState(String),

    #[error("Unknown tracked object: {0}")]
    UnknownObject(String),
}

impl SatTrackError {
    pub(crate) fn unavailable(provider: &str, reason: impl Into<String>) -> Self {
        SatTrackError::ProviderUnavailable {
            provider: provider.to_string(),
            reason: reason.into(),
        }
    }
}

impl PartialEq for SatTrackError {
    fn eq(&self, other: &Self) -> bool {
        use SatTrackError::*;
        match (self, other) {
            (InvalidElementSet(a), InvalidElementSet(b)) => a == b,
            (Sgp4Error(a), Sgp4Error(b)) => a == b,
            (
                ProviderUnavailable {
                    provider: p1,
                    reason: r1,
                },
                ProviderUnavailable {
                    provider: p2,
                    reason: r2,
                },
            ) => p1 == p2 && r1 == r2,

            // Not comparable: same variant is enough
            #[cfg(feature = "noaa-download")]
            (ReqwestError(_), ReqwestError(_)) => true,
            (TimeError(_), TimeError(_)) => true,

            (InvalidTrackerParameter(a), InvalidTrackerParameter(b)) => a == b,
            (NonFiniteState(a), NonFiniteState(b)) => a == b,
            (UnknownObject(a), UnknownObject(b)) => a == b,

            _ => false,
        }
    }
}
