use std::time::Duration;

#[allow(async_fn_in_trait)]
pub trait Pause {
    async fn pause(&self, duration: Duration);
}

/// Pacing of consecutive calls to a rate-limited remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Wait between two items.
    pub request_delay: Duration,
    /// Wait after the remote service reported a rate limit.
    pub rate_limit_delay: Duration,
    /// Wait after any other failed attempt.
    pub retry_delay: Duration,
    pub max_attempts: u32,
}

impl Pacing {
    pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(120);
    pub const DEFAULT_RATE_LIMIT_DELAY: Duration = Duration::from_secs(180);
    pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

    #[must_use]
    pub fn none() -> Self {
        Self {
            request_delay: Duration::ZERO,
            rate_limit_delay: Duration::ZERO,
            retry_delay: Duration::ZERO,
            max_attempts: 1,
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            request_delay: Self::DEFAULT_REQUEST_DELAY,
            rate_limit_delay: Self::DEFAULT_RATE_LIMIT_DELAY,
            retry_delay: Self::DEFAULT_RETRY_DELAY,
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
        }
    }
}
