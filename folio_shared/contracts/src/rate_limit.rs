use std::{future::Future, time::Duration};

use thiserror::Error;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait RateLimitService: Send + Sync + 'static {
    /// Consumes one token from the budget of `key`.
    ///
    /// Checking the remaining budget and consuming the token happen in a
    /// single atomic step, so concurrent calls for the same key can never
    /// exceed the budget of the current window. Rejected calls do not consume
    /// a token.
    fn consume(&self, key: &str) -> impl Future<Output = Result<(), RateLimitError>> + Send;
}

#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("The rate limit has been exceeded.")]
    Exceeded {
        /// Time until the current window expires.
        retry_after: Duration,
    },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(feature = "mock")]
impl MockRateLimitService {
    pub fn with_consume(mut self, key: String, result: Result<(), RateLimitError>) -> Self {
        self.expect_consume()
            .once()
            .with(mockall::predicate::eq(key))
            .return_once(|_| Box::pin(std::future::ready(result)));
        self
    }
}
