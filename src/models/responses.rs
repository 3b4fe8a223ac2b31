//! Response DTOs for the conditional cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Requests answered with 304 Not Modified
    pub short_circuits: u64,
    /// Conditional checks forwarded to the handler
    pub pass_throughs: u64,
    /// Validator tokens generated
    pub generations: u64,
    /// Validator generations that failed
    pub generation_failures: u64,
    /// Tokens cleared by successful mutations
    pub invalidations: u64,
    /// Failed mutations that kept their tokens
    pub skipped_invalidations: u64,
    /// Identities currently holding a token
    pub total_tokens: usize,
    /// Short-circuit rate (short_circuits / (short_circuits + pass_throughs))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            short_circuits: stats.short_circuits,
            pass_throughs: stats.pass_throughs,
            generations: stats.generations,
            generation_failures: stats.generation_failures,
            invalidations: stats.invalidations,
            skipped_invalidations: stats.skipped_invalidations,
            total_tokens: stats.total_tokens,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_response_from_cache_stats() {
        let stats = CacheStats {
            short_circuits: 8,
            pass_throughs: 2,
            generations: 2,
            invalidations: 1,
            total_tokens: 3,
            ..CacheStats::default()
        };
        let resp = StatsResponse::from(stats);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
        assert_eq!(resp.total_tokens, 3);
        assert_eq!(resp.invalidations, 1);
    }

    #[test]
    fn test_stats_response_zero_requests() {
        let resp = StatsResponse::from(CacheStats::default());
        assert_eq!(resp.hit_rate, 0.0);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("Something went wrong"));
    }
}
