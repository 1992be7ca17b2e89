//! Identity of the current scheduled execution.

use std::env;

use crate::ApiError;

/// Environment variable carrying the execution identity token.
pub const EXECUTION_TOKEN_ENV: &str = "FLYTE_INTERNAL_EXECUTION_ID";

/// Environment variable carrying the execution's unique name.
pub const EXECUTION_NAME_ENV: &str = "FLYTE_INTERNAL_EXECUTION_NAME";

/// Credential identifying the current execution to internal services.
#[derive(Clone, PartialEq, Eq)]
pub struct ExecutionIdentity {
    token: String,
}

impl ExecutionIdentity {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }

    /// Read the token from [`EXECUTION_TOKEN_ENV`].
    ///
    /// Blank values count as missing.
    pub fn from_env() -> Result<Self, ApiError> {
        env::var(EXECUTION_TOKEN_ENV)
            .ok()
            .filter(|token| !token.trim().is_empty())
            .map(Self::new)
            .ok_or(ApiError::MissingToken {
                variable: EXECUTION_TOKEN_ENV,
            })
    }

    /// Value of the `Authorization` header for internal services.
    pub fn authorization_header(&self) -> String {
        format!("Latch-Execution-Token {}", self.token)
    }
}

impl std::fmt::Debug for ExecutionIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionIdentity").field("token", &"<redacted>").finish()
    }
}

/// Resolves the unique name of the current execution.
///
/// Returning `None` means the name is unavailable; callers skip work that
/// needs it instead of failing.
pub trait ExecutionNameSource {
    fn execution_name(&self) -> Option<String>;
}

impl<F> ExecutionNameSource for F
where
    F: Fn() -> Option<String>,
{
    fn execution_name(&self) -> Option<String> {
        self()
    }
}

/// Reads the execution name from an environment variable.
#[derive(Debug, Clone)]
pub struct EnvExecutionName {
    variable: String,
}

impl EnvExecutionName {
    pub fn new(variable: impl Into<String>) -> Self {
        Self { variable: variable.into() }
    }
}

impl Default for EnvExecutionName {
    fn default() -> Self {
        Self::new(EXECUTION_NAME_ENV)
    }
}

impl ExecutionNameSource for EnvExecutionName {
    fn execution_name(&self) -> Option<String> {
        env::var(&self.variable)
            .ok()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_blank_token_is_a_configuration_error() {
        temp_env::with_var(EXECUTION_TOKEN_ENV, None::<&str>, || {
            let error = ExecutionIdentity::from_env().unwrap_err();
            assert!(error.is_configuration());
        });
        temp_env::with_var(EXECUTION_TOKEN_ENV, Some("  "), || {
            assert!(ExecutionIdentity::from_env().is_err());
        });
    }

    #[test]
    fn token_is_sent_with_the_platform_scheme_and_hidden_in_debug() {
        let identity = ExecutionIdentity::new("exec-123");
        assert_eq!(identity.authorization_header(), "Latch-Execution-Token exec-123");
        assert!(!format!("{identity:?}").contains("exec-123"));
    }

    #[test]
    fn execution_name_comes_from_the_environment() {
        temp_env::with_var(EXECUTION_NAME_ENV, Some("detaxizer-run-7"), || {
            assert_eq!(EnvExecutionName::default().execution_name().as_deref(), Some("detaxizer-run-7"));
        });
        temp_env::with_var(EXECUTION_NAME_ENV, None::<&str>, || {
            assert_eq!(EnvExecutionName::default().execution_name(), None);
        });
        let fixed = || Some("fixed".to_string());
        assert_eq!(fixed.execution_name().as_deref(), Some("fixed"));
    }
}
