use crate::error::GeolocationError;
use crate::models::{valid_coordinates, Position};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached fix the caller will accept; zero forces a fresh fix.
    pub maximum_age: Duration,
}

impl PositionOptions {
    pub fn fresh(timeout: Duration) -> Self {
        Self {
            high_accuracy: true,
            timeout,
            maximum_age: Duration::ZERO,
        }
    }
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self::fresh(Duration::from_secs(15))
    }
}

/// Source of device position fixes.
#[async_trait]
pub trait PositionProvider: Send + Sync {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> std::result::Result<Position, GeolocationError>;
}

/// Coordinates supplied up front (for example on the command line).
pub struct FixedPosition {
    position: Option<Position>,
}

impl FixedPosition {
    pub fn new(latitude: f64, longitude: f64, accuracy_m: Option<f64>) -> Self {
        let mut position = Position::new(latitude, longitude);
        position.accuracy_m = accuracy_m;
        Self {
            position: Some(position),
        }
    }

    pub fn unsupported() -> Self {
        Self { position: None }
    }
}

#[async_trait]
impl PositionProvider for FixedPosition {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> std::result::Result<Position, GeolocationError> {
        let mut position = self.position.clone().ok_or(GeolocationError::Unsupported)?;
        position.acquired_at = chrono::Utc::now();
        Ok(position)
    }
}

/// Ask the provider for a fix, bounded by `options.timeout`.
pub async fn acquire_position(
    provider: &dyn PositionProvider,
    options: &PositionOptions,
) -> std::result::Result<Position, GeolocationError> {
    let position = tokio::time::timeout(options.timeout, provider.current_position(options))
        .await
        .map_err(|_| GeolocationError::Timeout)??;

    if !valid_coordinates(position.latitude, position.longitude) {
        return Err(GeolocationError::PositionUnavailable);
    }

    debug!(
        "Acquired position {:.4}, {:.4} (accuracy {:?} m)",
        position.latitude, position.longitude, position.accuracy_m
    );
    Ok(position)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stalled;

    #[async_trait]
    impl PositionProvider for Stalled {
        async fn current_position(
            &self,
            _options: &PositionOptions,
        ) -> std::result::Result<Position, GeolocationError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(GeolocationError::PositionUnavailable)
        }
    }

    struct Denied;

    #[async_trait]
    impl PositionProvider for Denied {
        async fn current_position(
            &self,
            _options: &PositionOptions,
        ) -> std::result::Result<Position, GeolocationError> {
            Err(GeolocationError::PermissionDenied)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn acquisition_times_out() {
        let options = PositionOptions::fresh(Duration::from_secs(15));
        let err = acquire_position(&Stalled, &options).await.unwrap_err();
        assert_eq!(err, GeolocationError::Timeout);
    }

    #[tokio::test]
    async fn provider_errors_pass_through() {
        let err = acquire_position(&Denied, &PositionOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err, GeolocationError::PermissionDenied);
    }

    #[tokio::test]
    async fn fixed_position() {
        let provider = FixedPosition::new(38.58, -121.49, Some(12.0));
        let position = acquire_position(&provider, &PositionOptions::default())
            .await
            .unwrap();
        assert_eq!(position.latitude, 38.58);
        assert_eq!(position.accuracy_m, Some(12.0));

        let err = acquire_position(&FixedPosition::unsupported(), &PositionOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err, GeolocationError::Unsupported);
    }

    #[tokio::test]
    async fn out_of_range_fix_is_unavailable() {
        let provider = FixedPosition::new(123.0, 0.0, None);
        let err = acquire_position(&provider, &PositionOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err, GeolocationError::PositionUnavailable);
    }
}
