//! Error types for route generation and collaborator calls.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RouteError>;

/// Failure reported by an external collaborator (directions, geocoder, weather).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Transport(String),

    #[error("provider request timed out")]
    Timeout,

    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("provider response malformed: {0}")]
    Decode(String),
}

/// Route generation failure. The API layer maps these to client-facing
/// `{error, message}` pairs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RouteError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    InvalidWaypoint(String),

    #[error("{0}")]
    OutsideBoundary(String),

    #[error("{0}")]
    InvalidStartLocation(String),

    #[error("{0}")]
    InvalidEndLocation(String),

    #[error("{0}")]
    ProviderUnavailable(String),

    #[error("{0}")]
    ShortestRouteUnavailable(String),

    #[error("{0}")]
    DASegmentFailed(String),

    #[error("{0}")]
    ABCEndSegmentFailed(String),

    #[error("no valid rectangle orientation produced a route")]
    NoValidRouteFound,

    #[error("{0}")]
    InvalidCorners(String),

    #[error("{0}")]
    InvalidRoute(String),

    #[error("{0}")]
    RouteParseError(String),

    #[error("route has {0} coordinates, at least 2 are required")]
    InsufficientCoords(usize),

    #[error("route generation exceeded {0}s deadline")]
    RouteGenerationTimeout(u64),
}

impl RouteError {
    /// Stable error name exposed to clients.
    pub fn kind(&self) -> &'static str {
        match self {
            RouteError::InvalidInput(_) => "InvalidInput",
            RouteError::InvalidWaypoint(_) => "InvalidWaypoint",
            RouteError::OutsideBoundary(_) => "OutsideBoundary",
            RouteError::InvalidStartLocation(_) => "InvalidStartLocation",
            RouteError::InvalidEndLocation(_) => "InvalidEndLocation",
            RouteError::ProviderUnavailable(_) => "ProviderUnavailable",
            RouteError::ShortestRouteUnavailable(_) => "ShortestRouteUnavailable",
            RouteError::DASegmentFailed(_) => "DASegmentFailed",
            RouteError::ABCEndSegmentFailed(_) => "ABCEndSegmentFailed",
            RouteError::NoValidRouteFound => "NoValidRouteFound",
            RouteError::InvalidCorners(_) => "InvalidCorners",
            RouteError::InvalidRoute(_) => "InvalidRoute",
            RouteError::RouteParseError(_) => "RouteParseError",
            RouteError::InsufficientCoords(_) => "InsufficientCoords",
            RouteError::RouteGenerationTimeout(_) => "RouteGenerationTimeout",
        }
    }

    /// Validation, boundary and unresolvable-location errors are the
    /// caller's fault; everything else is a provider or internal failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RouteError::InvalidInput(_)
                | RouteError::InvalidWaypoint(_)
                | RouteError::OutsideBoundary(_)
                | RouteError::InvalidStartLocation(_)
                | RouteError::InvalidEndLocation(_)
        )
    }
}
