//! Bounded retry around a single remote call.
//!
//! The policy is an explicit value handed to a higher-order wrapper rather
//! than anything baked into the client: callers choose which statuses count
//! as success and which are handed back without burning retry budget.

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use tokio::time::sleep;
use tracing::{error, warn};

use super::client::ApiResponse;
use crate::error::Result;

/// A known dashboard message meaning the provider credential cannot write
/// to the service. Retrying never helps; the operator has to fix the token.
pub const TERMINAL_PROVIDER_ERROR: &str = "failed to clone service";

/// A response the caller wants handed back untouched instead of retried.
#[derive(Debug, Clone)]
struct HaltRule {
    status: StatusCode,
    /// When set, the rule only applies to bodies whose message contains
    /// this fragment; an unrecognized message on the same status is still
    /// treated as transient.
    message_contains: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
    /// Statuses returned to the caller as success.
    success: Vec<StatusCode>,
    /// Responses returned to the caller immediately for its own handling.
    /// 401 always behaves this way.
    halt: Vec<HaltRule>,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
            success: vec![StatusCode::OK],
            halt: Vec::new(),
        }
    }

    /// Also treat `status` as success (e.g. 201 on creation).
    pub fn accepting(mut self, status: StatusCode) -> Self {
        self.success.push(status);
        self
    }

    /// Hand any response with `status` straight back to the caller.
    pub fn halting_on(mut self, status: StatusCode) -> Self {
        self.halt.push(HaltRule {
            status,
            message_contains: None,
        });
        self
    }

    /// Hand a response with `status` back to the caller only when its
    /// message contains `fragment` (e.g. an expected-absence signal).
    pub fn halting_on_message(mut self, status: StatusCode, fragment: impl Into<String>) -> Self {
        self.halt.push(HaltRule {
            status,
            message_contains: Some(fragment.into()),
        });
        self
    }

    pub fn is_success(&self, status: StatusCode) -> bool {
        self.success.contains(&status)
    }

    fn halts(&self, status: StatusCode, message: &str) -> bool {
        if status == StatusCode::UNAUTHORIZED {
            return true;
        }
        self.halt.iter().any(|rule| {
            rule.status == status
                && rule
                    .message_contains
                    .as_deref()
                    .map_or(true, |fragment| message.contains(fragment))
        })
    }
}

/// Invoke `call` until it succeeds per the policy, a non-retryable condition
/// shows up, or the attempt ceiling is reached. The last response is always
/// returned as-is for the caller to inspect.
pub async fn call_with_retry<F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut call: F,
) -> Result<ApiResponse>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<ApiResponse>>,
{
    let mut attempt: u32 = 1;
    loop {
        let last = attempt >= policy.max_attempts;

        let response = match call().await {
            Ok(response) => response,
            Err(e) if last => return Err(e),
            Err(e) => {
                warn!(
                    call = label,
                    attempt,
                    max_attempts = policy.max_attempts,
                    error = %e,
                    "request failed, retrying"
                );
                sleep(policy.backoff).await;
                attempt += 1;
                continue;
            }
        };

        if policy.is_success(response.status) {
            return Ok(response);
        }

        if response.status == StatusCode::UNAUTHORIZED {
            warn!(call = label, "unauthorized (401), not retrying");
            return Ok(response);
        }

        let message = response.message();
        if policy.halts(response.status, &message) {
            return Ok(response);
        }

        if message.contains(TERMINAL_PROVIDER_ERROR) {
            error!(
                call = label,
                %message,
                "terminal provider error; check the provider API token"
            );
            return Ok(response);
        }

        if last {
            warn!(
                call = label,
                status = response.status.as_u16(),
                %message,
                "retry budget exhausted"
            );
            return Ok(response);
        }

        warn!(
            call = label,
            status = response.status.as_u16(),
            %message,
            attempt,
            max_attempts = policy.max_attempts,
            backoff_secs = policy.backoff.as_secs(),
            "call failed, backing off before retry"
        );
        sleep(policy.backoff).await;
        attempt += 1;
    }
}
