//! Authorization-mode fallback
//!
//! Every remote read or write is first attempted under the user-pool mode. If
//! that attempt fails with an authorization-denied message, it is retried
//! exactly once under the identity-pool mode. Nothing else is retried, and the
//! retry itself never falls back further.
//!
//! A call that resolves with a non-empty error list is a rejection, not an
//! authorization failure, and is never retried even when one of the joined
//! messages happens to contain an authorization phrase.

use crate::models::auth::{DataAccessError, RemoteFailure};
use crate::models::{AuthMode, RemoteResponse};
use crate::utils::logging::LoggingHelper;
use std::future::Future;

#[derive(Debug, Clone, Copy, Default)]
pub struct AuthModeFallbackExecutor;

impl AuthModeFallbackExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Run `primary`, falling back to `secondary` on authorization denial
    ///
    /// # Errors
    ///
    /// Returns `DataAccessError::Rejected` when the call that ran last resolved
    /// with an error list, or `DataAccessError::Remote` when it failed outright
    pub async fn execute<T, P, PF, S, SF>(
        &self,
        primary: P,
        secondary: S,
    ) -> Result<Option<T>, DataAccessError>
    where
        P: FnOnce() -> PF,
        PF: Future<Output = Result<RemoteResponse<T>, RemoteFailure>>,
        S: FnOnce() -> SF,
        SF: Future<Output = Result<RemoteResponse<T>, RemoteFailure>>,
    {
        match primary().await {
            Ok(response) => Self::take_data(response, AuthMode::UserPool),
            Err(failure) if failure.is_authorization_denied() => {
                LoggingHelper::log_fallback_triggered(&failure.message);
                match secondary().await {
                    Ok(response) => Self::take_data(response, AuthMode::IdentityPool),
                    Err(failure) => {
                        LoggingHelper::log_remote_failure(AuthMode::IdentityPool, &failure.message);
                        Err(failure.into())
                    }
                }
            }
            Err(failure) => {
                LoggingHelper::log_remote_failure(AuthMode::UserPool, &failure.message);
                Err(failure.into())
            }
        }
    }

    /// Run a mode-parameterized operation under the fallback policy
    ///
    /// # Errors
    ///
    /// See [`AuthModeFallbackExecutor::execute`]
    pub async fn run<T, F, Fut>(&self, operation: F) -> Result<Option<T>, DataAccessError>
    where
        F: Fn(AuthMode) -> Fut,
        Fut: Future<Output = Result<RemoteResponse<T>, RemoteFailure>>,
    {
        self.execute(
            || operation(AuthMode::UserPool),
            || operation(AuthMode::IdentityPool),
        )
        .await
    }

    fn take_data<T>(
        response: RemoteResponse<T>,
        mode: AuthMode,
    ) -> Result<Option<T>, DataAccessError> {
        if let Some(joined) = response.joined_errors() {
            LoggingHelper::log_rejected(mode, &joined);
            return Err(DataAccessError::Rejected(joined));
        }
        Ok(response.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RemoteError;
    use std::cell::Cell;

    type Outcome = Result<RemoteResponse<&'static str>, RemoteFailure>;

    async fn resolve(outcome: Outcome) -> Outcome {
        outcome
    }

    #[tokio::test]
    async fn test_primary_success_skips_secondary() {
        let secondary_calls = Cell::new(0);
        let result = AuthModeFallbackExecutor::new()
            .execute(
                || resolve(Ok(RemoteResponse::ok("primary"))),
                || {
                    secondary_calls.set(secondary_calls.get() + 1);
                    resolve(Ok(RemoteResponse::ok("secondary")))
                },
            )
            .await;

        assert_eq!(result, Ok(Some("primary")));
        assert_eq!(secondary_calls.get(), 0);
    }

    #[tokio::test]
    async fn test_not_authorized_falls_back_once() {
        let secondary_calls = Cell::new(0);
        let result = AuthModeFallbackExecutor::new()
            .execute(
                || resolve(Err(RemoteFailure::new("Not Authorized"))),
                || {
                    secondary_calls.set(secondary_calls.get() + 1);
                    resolve(Ok(RemoteResponse::ok("secondary")))
                },
            )
            .await;

        assert_eq!(result, Ok(Some("secondary")));
        assert_eq!(secondary_calls.get(), 1);
    }

    #[tokio::test]
    async fn test_each_phrase_triggers_fallback() {
        for message in [
            "Not Authorized to access listLoads on type Query",
            "Unauthorized",
            "No credentials: Missing credentials in config",
        ] {
            let result = AuthModeFallbackExecutor::new()
                .execute(
                    || resolve(Err(RemoteFailure::new(message))),
                    || resolve(Ok(RemoteResponse::ok("secondary"))),
                )
                .await;
            assert_eq!(result, Ok(Some("secondary")), "{message}");
        }
    }

    #[tokio::test]
    async fn test_other_failure_propagates_without_retry() {
        let secondary_calls = Cell::new(0);
        let result = AuthModeFallbackExecutor::new()
            .execute(
                || resolve(Err(RemoteFailure::new("Some other error"))),
                || {
                    secondary_calls.set(secondary_calls.get() + 1);
                    resolve(Ok(RemoteResponse::ok("secondary")))
                },
            )
            .await;

        let expected = DataAccessError::Remote(RemoteFailure::new("Some other error"));
        assert_eq!(result, Err(expected));
        assert_eq!(secondary_calls.get(), 0);
    }

    #[tokio::test]
    async fn test_error_list_is_rejected_without_retry() {
        let secondary_calls = Cell::new(0);
        let result = AuthModeFallbackExecutor::new()
            .execute(
                || resolve(Ok(RemoteResponse::with_errors(vec![RemoteError::new("x")]))),
                || {
                    secondary_calls.set(secondary_calls.get() + 1);
                    resolve(Ok(RemoteResponse::ok("secondary")))
                },
            )
            .await;

        assert_eq!(result, Err(DataAccessError::Rejected("x".to_string())));
        assert_eq!(secondary_calls.get(), 0);
    }

    #[tokio::test]
    async fn test_error_list_with_authorization_phrase_is_not_retried() {
        let secondary_calls = Cell::new(0);
        let errors = vec![
            RemoteError::new("Not Authorized to access firmId"),
            RemoteError::new("second"),
        ];
        let result = AuthModeFallbackExecutor::new()
            .execute(
                || resolve(Ok(RemoteResponse::with_errors(errors))),
                || {
                    secondary_calls.set(secondary_calls.get() + 1);
                    resolve(Ok(RemoteResponse::ok("secondary")))
                },
            )
            .await;

        let joined = "Not Authorized to access firmId, second".to_string();
        assert_eq!(result, Err(DataAccessError::Rejected(joined)));
        assert_eq!(secondary_calls.get(), 0);
    }

    #[tokio::test]
    async fn test_secondary_failures_are_final() {
        let executor = AuthModeFallbackExecutor::new();

        let denied_twice = executor
            .execute(
                || resolve(Err(RemoteFailure::new("Unauthorized"))),
                || resolve(Err(RemoteFailure::new("Not Authorized"))),
            )
            .await;
        let expected = DataAccessError::Remote(RemoteFailure::new("Not Authorized"));
        assert_eq!(denied_twice, Err(expected));

        let bad_input = vec![RemoteError::new("bad input")];
        let secondary_rejected = executor
            .execute(
                || resolve(Err(RemoteFailure::new("Unauthorized"))),
                || resolve(Ok(RemoteResponse::with_errors(bad_input))),
            )
            .await;
        assert_eq!(
            secondary_rejected,
            Err(DataAccessError::Rejected("bad input".to_string()))
        );
    }

    #[tokio::test]
    async fn test_run_binds_modes_in_order() {
        let modes = std::sync::Mutex::new(Vec::new());
        let result = AuthModeFallbackExecutor::new()
            .run(|mode| {
                modes.lock().unwrap().push(mode);
                let outcome = match mode {
                    AuthMode::UserPool => Err(RemoteFailure::new("Unauthorized")),
                    AuthMode::IdentityPool => Ok(RemoteResponse::ok("ok")),
                };
                resolve(outcome)
            })
            .await;

        assert_eq!(result, Ok(Some("ok")));
        assert_eq!(
            *modes.lock().unwrap(),
            vec![AuthMode::UserPool, AuthMode::IdentityPool]
        );
    }

    #[tokio::test]
    async fn test_null_data_without_errors_is_ok() {
        let result = AuthModeFallbackExecutor::new()
            .run(|_| resolve(Ok(RemoteResponse::empty())))
            .await;
        assert_eq!(result, Ok(None));
    }
}
