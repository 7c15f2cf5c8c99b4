//! Retry strategies and predicates.
//!
//! Two retry layers exist. [`RetryStrategy`] and [`RetryPredicate`] configure
//! the [`HttpTransport`](crate::HttpTransport), which may retry a single
//! request on network faults and 5xx answers. [`RateLimitPolicy`] configures
//! the bulk loops, which own the handling of 429 answers.

use crate::transport::RawResponse;
use crate::Error;
use rand::Rng;
use std::time::Duration;

/// Defines when and how the transport retries a failed request.
///
/// # Examples
///
/// ```
/// use storyblok_mapi::RetryStrategy;
/// use std::time::Duration;
///
/// // No retries
/// let no_retry = RetryStrategy::None;
///
/// // Exponential backoff: 100ms, 200ms, 400ms, 800ms...
/// let exponential = RetryStrategy::ExponentialBackoff {
///     initial_delay: Duration::from_millis(100),
///     max_delay: Duration::from_secs(30),
///     max_retries: 5,
///     jitter: true,
/// };
///
/// // Linear backoff: 1s, 1s, 1s...
/// let linear = RetryStrategy::Linear {
///     delay: Duration::from_secs(1),
///     max_retries: 3,
/// };
/// assert_eq!(linear.max_retries(), Some(3));
/// ```
#[derive(Debug, Clone, Default)]
pub enum RetryStrategy {
    /// Do not retry failed requests.
    #[default]
    None,

    /// Retry with exponentially increasing delays.
    ///
    /// Each retry waits for `initial_delay * 2^(attempt - 1)` (capped at `max_delay`).
    ExponentialBackoff {
        /// The initial delay before the first retry.
        initial_delay: Duration,
        /// The maximum delay between retries.
        max_delay: Duration,
        /// The maximum number of retry attempts.
        max_retries: usize,
        /// Whether to scale each delay by a random factor in `[0.5, 1.0]`.
        jitter: bool,
    },

    /// Retry with a fixed delay between attempts.
    Linear {
        /// The delay between retry attempts.
        delay: Duration,
        /// The maximum number of retry attempts.
        max_retries: usize,
    },

    /// Custom retry logic.
    ///
    /// Takes the attempt number (1-indexed) and returns the delay before the
    /// next attempt, or `None` to stop.
    Custom {
        delay_fn: fn(attempt: usize) -> Option<Duration>,
    },
}

impl RetryStrategy {
    /// Returns the delay before the given retry attempt, or `None` if retries are exhausted.
    ///
    /// `attempt` is 1-indexed: 1 is the first retry.
    pub fn delay_for_attempt(&self, attempt: usize) -> Option<Duration> {
        match self {
            RetryStrategy::None => None,
            RetryStrategy::ExponentialBackoff {
                initial_delay,
                max_delay,
                max_retries,
                jitter,
            } => {
                if attempt > *max_retries {
                    return None;
                }

                let multiplier = 2u64.saturating_pow(attempt.saturating_sub(1) as u32);
                let base_delay =
                    initial_delay.saturating_mul(multiplier.try_into().unwrap_or(u32::MAX));
                let delay = base_delay.min(*max_delay);

                if *jitter {
                    let jitter_factor = rand::thread_rng().gen_range(0.5..=1.0);
                    Some(delay.mul_f64(jitter_factor))
                } else {
                    Some(delay)
                }
            }
            RetryStrategy::Linear { delay, max_retries } => {
                if attempt > *max_retries {
                    None
                } else {
                    Some(*delay)
                }
            }
            RetryStrategy::Custom { delay_fn } => delay_fn(attempt),
        }
    }

    /// Returns the maximum number of retries, if known.
    pub fn max_retries(&self) -> Option<usize> {
        match self {
            RetryStrategy::None => Some(0),
            RetryStrategy::ExponentialBackoff { max_retries, .. } => Some(*max_retries),
            RetryStrategy::Linear { max_retries, .. } => Some(*max_retries),
            RetryStrategy::Custom { .. } => None,
        }
    }
}

/// The result of one transport attempt, as seen by a [`RetryPredicate`].
#[derive(Debug, Clone, Copy)]
pub enum Outcome<'a> {
    /// The server answered, possibly with a non-2xx status.
    Response(&'a RawResponse),
    /// No response was received.
    Error(&'a Error),
}

/// Decides whether the transport retries an attempt.
///
/// # Examples
///
/// ```
/// use storyblok_mapi::retry::{Outcome, RetryPredicate};
///
/// struct RetryOnBadGateway;
///
/// impl RetryPredicate for RetryOnBadGateway {
///     fn should_retry(&self, outcome: &Outcome<'_>, _attempt: usize) -> bool {
///         matches!(outcome, Outcome::Response(r) if r.status.as_u16() == 502)
///     }
/// }
/// ```
pub trait RetryPredicate: Send + Sync {
    /// Returns `true` if the attempt should be retried.
    ///
    /// `attempt` is 1-indexed.
    fn should_retry(&self, outcome: &Outcome<'_>, attempt: usize) -> bool;
}

/// Retries network errors, timeouts and 5xx answers.
///
/// 429 is not retried here; the bulk loops handle it with their own budget.
#[derive(Debug, Clone, Copy)]
pub struct RetryOnRetryable;

impl RetryPredicate for RetryOnRetryable {
    fn should_retry(&self, outcome: &Outcome<'_>, _attempt: usize) -> bool {
        match outcome {
            Outcome::Response(response) => response.status.is_server_error(),
            Outcome::Error(error) => error.is_retryable(),
        }
    }
}

/// Retries only 5xx answers.
#[derive(Debug, Clone, Copy)]
pub struct RetryOn5xx;

impl RetryPredicate for RetryOn5xx {
    fn should_retry(&self, outcome: &Outcome<'_>, _attempt: usize) -> bool {
        matches!(outcome, Outcome::Response(response) if response.status.is_server_error())
    }
}

/// Retries only timeouts.
#[derive(Debug, Clone, Copy)]
pub struct RetryOnTimeout;

impl RetryPredicate for RetryOnTimeout {
    fn should_retry(&self, outcome: &Outcome<'_>, _attempt: usize) -> bool {
        matches!(outcome, Outcome::Error(Error::Timeout))
    }
}

/// Retries only connection errors.
#[derive(Debug, Clone, Copy)]
pub struct RetryOnConnectionError;

impl RetryPredicate for RetryOnConnectionError {
    fn should_retry(&self, outcome: &Outcome<'_>, _attempt: usize) -> bool {
        matches!(outcome, Outcome::Error(Error::Network(_)))
    }
}

/// Retries if any inner predicate does.
///
/// ```
/// use storyblok_mapi::retry::{OrPredicate, RetryOn5xx, RetryOnTimeout};
///
/// let predicate = OrPredicate::new(vec![
///     Box::new(RetryOn5xx),
///     Box::new(RetryOnTimeout),
/// ]);
/// ```
pub struct OrPredicate {
    predicates: Vec<Box<dyn RetryPredicate>>,
}

impl OrPredicate {
    pub fn new(predicates: Vec<Box<dyn RetryPredicate>>) -> Self {
        Self { predicates }
    }
}

impl RetryPredicate for OrPredicate {
    fn should_retry(&self, outcome: &Outcome<'_>, attempt: usize) -> bool {
        self.predicates
            .iter()
            .any(|p| p.should_retry(outcome, attempt))
    }
}

/// Retries only if every inner predicate does.
pub struct AndPredicate {
    predicates: Vec<Box<dyn RetryPredicate>>,
}

impl AndPredicate {
    pub fn new(predicates: Vec<Box<dyn RetryPredicate>>) -> Self {
        Self { predicates }
    }
}

impl RetryPredicate for AndPredicate {
    fn should_retry(&self, outcome: &Outcome<'_>, attempt: usize) -> bool {
        self.predicates
            .iter()
            .all(|p| p.should_retry(outcome, attempt))
    }
}

/// How the bulk loops react to 429 Too Many Requests.
///
/// After a 429 the loop sleeps for `backoff` and repeats the same request,
/// at most `max_retries` times in a row for one page or item. The counter
/// resets after every successful answer.
///
/// ```
/// use storyblok_mapi::RateLimitPolicy;
/// use std::time::Duration;
///
/// let policy = RateLimitPolicy::default();
/// assert_eq!(policy.max_retries, 3);
/// assert_eq!(policy.backoff, Duration::from_secs(1));
/// assert!(policy.allows_retry(2));
/// assert!(!policy.allows_retry(3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Consecutive 429 retries allowed for one page or item.
    pub max_retries: usize,
    /// Sleep before each retry.
    pub backoff: Duration,
}

impl RateLimitPolicy {
    pub const DEFAULT_MAX_RETRIES: usize = 3;
    pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

    pub fn new(max_retries: usize, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    /// Returns `true` if another retry is allowed after `retries_so_far` retries.
    pub fn allows_retry(&self, retries_so_far: usize) -> bool {
        retries_so_far < self.max_retries
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_RETRIES, Self::DEFAULT_BACKOFF)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_exponential_backoff_delays() {
        let strategy = RetryStrategy::ExponentialBackoff {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(500),
            max_retries: 4,
            jitter: false,
        };

        assert_eq!(
            strategy.delay_for_attempt(1),
            Some(Duration::from_millis(100))
        );
        assert_eq!(
            strategy.delay_for_attempt(2),
            Some(Duration::from_millis(200))
        );
        assert_eq!(
            strategy.delay_for_attempt(3),
            Some(Duration::from_millis(400))
        );
        assert_eq!(
            strategy.delay_for_attempt(4),
            Some(Duration::from_millis(500))
        );
        assert_eq!(strategy.delay_for_attempt(5), None);
    }

    #[test]
    fn test_linear_delays() {
        let strategy = RetryStrategy::Linear {
            delay: Duration::from_secs(1),
            max_retries: 2,
        };

        assert_eq!(strategy.delay_for_attempt(1), Some(Duration::from_secs(1)));
        assert_eq!(strategy.delay_for_attempt(2), Some(Duration::from_secs(1)));
        assert_eq!(strategy.delay_for_attempt(3), None);
        assert_eq!(RetryStrategy::None.delay_for_attempt(1), None);
    }

    #[test]
    fn test_default_predicate_leaves_rate_limits_alone() {
        let predicate = RetryOnRetryable;
        let throttled = RawResponse::new(StatusCode::TOO_MANY_REQUESTS, "");
        let unavailable = RawResponse::new(StatusCode::SERVICE_UNAVAILABLE, "");
        let not_found = RawResponse::new(StatusCode::NOT_FOUND, "");

        assert!(!predicate.should_retry(&Outcome::Response(&throttled), 1));
        assert!(!predicate.should_retry(&Outcome::Response(&not_found), 1));
        assert!(predicate.should_retry(&Outcome::Response(&unavailable), 1));
        assert!(predicate.should_retry(&Outcome::Error(&Error::Timeout), 1));
    }

    #[test]
    fn test_combined_predicates() {
        let bad_gateway = RawResponse::new(StatusCode::BAD_GATEWAY, "");
        let any = OrPredicate::new(vec![Box::new(RetryOnTimeout), Box::new(RetryOn5xx)]);
        let all = AndPredicate::new(vec![Box::new(RetryOnTimeout), Box::new(RetryOn5xx)]);

        assert!(any.should_retry(&Outcome::Response(&bad_gateway), 1));
        assert!(!all.should_retry(&Outcome::Response(&bad_gateway), 1));
    }
}
