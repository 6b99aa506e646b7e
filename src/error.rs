use thiserror::Error;

#[derive(Error, Debug)]
pub enum CropWiseError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error("Rate limited (429): {0}")]
    RateLimited(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Geolocation(#[from] GeolocationError),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl CropWiseError {
    /// Rate limits are recognised either by variant or by a "429" marker in
    /// the upstream message, since providers report them inconsistently.
    pub fn is_rate_limit(&self) -> bool {
        match self {
            CropWiseError::RateLimited(_) => true,
            CropWiseError::Http(e) => {
                e.status().map(|s| s.as_u16() == 429).unwrap_or(false) || e.to_string().contains("429")
            }
            CropWiseError::Upstream(msg) => msg.contains("429"),
            _ => false,
        }
    }

    /// Short explanation suitable for showing to the person using the app.
    pub fn user_message(&self) -> String {
        if self.is_rate_limit() {
            return "API rate limit reached. Please wait a minute and try again.".to_string();
        }
        match self {
            CropWiseError::Geolocation(e) => e.user_message().to_string(),
            CropWiseError::Validation(e) => e.to_string(),
            other => {
                let detail = other.to_string();
                if detail.len() < 100 {
                    detail
                } else {
                    "The request failed. Re-run with -v for details.".to_string()
                }
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeolocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("position unavailable")]
    PositionUnavailable,

    #[error("timed out acquiring position")]
    Timeout,

    #[error("geolocation is not supported")]
    Unsupported,
}

impl GeolocationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            GeolocationError::PermissionDenied => {
                "Permission denied. Please enable location services for this application."
            }
            GeolocationError::PositionUnavailable => "Location information is unavailable.",
            GeolocationError::Timeout => "The request to get your location timed out.",
            GeolocationError::Unsupported => "Geolocation is not supported on this device.",
        }
    }
}

pub type Result<T> = std::result::Result<T, CropWiseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_detected_by_marker() {
        let err = CropWiseError::Upstream("Gemini returned 429 Too Many Requests".into());
        assert!(err.is_rate_limit());
        assert!(err.user_message().contains("rate limit"));

        let err = CropWiseError::Upstream("Gemini returned 500".into());
        assert!(!err.is_rate_limit());
    }

    #[test]
    fn rate_limited_variant_is_rate_limit() {
        assert!(CropWiseError::RateLimited("quota".into()).is_rate_limit());
    }

    #[test]
    fn geolocation_errors_have_distinct_messages() {
        let messages = [
            GeolocationError::PermissionDenied.user_message(),
            GeolocationError::PositionUnavailable.user_message(),
            GeolocationError::Timeout.user_message(),
            GeolocationError::Unsupported.user_message(),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn long_messages_are_shortened() {
        let err = CropWiseError::Upstream("x".repeat(200));
        assert!(err.user_message().len() < 100);
    }
}
