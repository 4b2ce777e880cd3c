//! Retry policy for transport operations

use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use git2::ErrorClass;

/// Exponential backoff bounds for fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    /// Give up after this much time; zero disables retries.
    pub max_elapsed: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(8),
            max_elapsed: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Try once, never retry.
    pub fn none() -> Self {
        Self {
            max_elapsed: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Run `op`, retrying transient git transport failures.
    pub(crate) fn run<T>(
        &self,
        what: &str,
        mut op: impl FnMut() -> Result<T, git2::Error>,
    ) -> Result<T, git2::Error> {
        if self.max_elapsed.is_zero() {
            return op();
        }

        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_interval)
            .with_max_interval(self.max_interval)
            .with_max_elapsed_time(Some(self.max_elapsed))
            .build();

        backoff::retry_notify(
            policy,
            || {
                op().map_err(|e| {
                    if is_transient(&e) {
                        backoff::Error::transient(e)
                    } else {
                        backoff::Error::permanent(e)
                    }
                })
            },
            |e: git2::Error, wait: Duration| {
                tracing::warn!(target_ref = what, error = %e, ?wait, "Transient git failure, retrying");
            },
        )
        .map_err(|e| match e {
            backoff::Error::Permanent(e) | backoff::Error::Transient { err: e, .. } => e,
        })
    }
}

/// Network-level failures are worth retrying; client errors are not.
fn is_transient(error: &git2::Error) -> bool {
    // libgit2 reports a missing local remote under the Net class.
    let message = error.message();
    if message.contains("unsupported URL protocol") || message.contains("could not find repository")
    {
        return false;
    }
    match error.class() {
        ErrorClass::Net | ErrorClass::Ssl | ErrorClass::Ssh => true,
        ErrorClass::Http => !message.contains("status code: 4"),
        _ => false,
    }
}
