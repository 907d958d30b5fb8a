//! API-key authentication.
//!
//! The expected key is read once at startup. Requests present their key in the `x-api-key`
//! metadata entry.

use tonic::{Request, Status};

/// Metadata key carrying the caller's API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Environment variable holding the expected API key.
pub const API_KEY_ENV: &str = "API_KEY";

/// Checks presented API keys against the key configured at startup.
#[derive(Clone, Debug)]
pub struct ApiKeyGuard {
    expected: Option<String>,
}

impl ApiKeyGuard {
    /// A guard expecting `key`. A blank key rejects every request.
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        let expected = if key.trim().is_empty() {
            None
        } else {
            Some(key)
        };
        Self { expected }
    }

    /// A guard expecting the key in `API_KEY`.
    ///
    /// If the variable is unset every request is rejected, and a warning is logged once here.
    pub fn from_env() -> Self {
        let guard = Self::new(std::env::var(API_KEY_ENV).unwrap_or_default());
        if guard.expected.is_none() {
            tracing::warn!("{} is not set; all authenticated requests will be rejected", API_KEY_ENV);
        }
        guard
    }

    /// Validates a presented key.
    ///
    /// # Errors
    ///
    /// - `Status::internal` if no key is configured.
    /// - `Status::unauthenticated` if the key is missing or wrong.
    #[allow(clippy::result_large_err)]
    pub fn check(&self, provided: Option<&str>) -> Result<(), Status> {
        let expected = self
            .expected
            .as_deref()
            .ok_or_else(|| Status::internal("API_KEY not set in environment"))?;
        let provided =
            provided.ok_or_else(|| Status::unauthenticated("Missing x-api-key header"))?;

        if provided == expected {
            Ok(())
        } else {
            Err(Status::unauthenticated("Invalid API key"))
        }
    }

    /// Interceptor body: checks the `x-api-key` metadata of a gRPC request.
    #[allow(clippy::result_large_err)]
    pub fn intercept(&self, req: Request<()>) -> Result<Request<()>, Status> {
        let provided = req
            .metadata()
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());
        self.check(provided)?;
        Ok(req)
    }
}
