//! Rate limiting middleware using token bucket algorithm

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use classdesk_common::config::RateLimitConfig;
use classdesk_common::errors::AppError;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Process-wide limiter shared by every route
#[derive(Clone)]
pub struct GlobalRateLimiter {
    limiter: Arc<DefaultDirectRateLimiter>,
    requests_per_second: u32,
}

/// Build the limiter, or `None` when rate limiting is switched off
pub fn create_rate_limiter(config: &RateLimitConfig) -> Option<GlobalRateLimiter> {
    if !config.enabled {
        return None;
    }

    let rate = NonZeroU32::new(config.requests_per_second)?;
    let burst = NonZeroU32::new(config.burst)?;
    let quota = Quota::per_second(rate).allow_burst(burst);

    Some(GlobalRateLimiter {
        limiter: Arc::new(RateLimiter::direct(quota)),
        requests_per_second: rate.get(),
    })
}

/// Reject the request with 429 once the bucket is empty
pub async fn rate_limit_middleware(
    State(limiter): State<GlobalRateLimiter>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    match limiter.limiter.check() {
        Ok(_) => Ok(next.run(request).await),
        Err(_) => {
            tracing::warn!(path = %request.uri().path(), "Rate limit exceeded");
            Err(AppError::RateLimited {
                limit: limiter.requests_per_second,
            })
        }
    }
}
