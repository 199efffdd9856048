//! Deterministic mock implementation of the shared `chat_provider` contract.
//!
//! This crate contains no transport logic and is intended for local
//! development and controller-level integration testing.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use chat_provider::{ChatProvider, CompletionError, CompletionRequest, ProviderProfile};

/// Stable provider identifier used for explicit startup selection.
pub const MOCK_PROVIDER_ID: &str = "mock";

/// Scripted provider: replays queued outcomes, then echoes the last user message.
#[derive(Debug)]
pub struct MockProvider {
    scripted: Mutex<VecDeque<Result<String, CompletionError>>>,
    observed: Mutex<Vec<CompletionRequest>>,
    delay: Duration,
}

impl MockProvider {
    #[must_use]
    pub fn new() -> Self {
        Self {
            scripted: Mutex::new(VecDeque::new()),
            observed: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        }
    }

    /// Creates a provider that answers with `outcomes` in order.
    #[must_use]
    pub fn scripted(outcomes: Vec<Result<String, CompletionError>>) -> Self {
        Self {
            scripted: Mutex::new(outcomes.into()),
            ..Self::new()
        }
    }

    /// Sleeps for `delay` before every reply, simulating network latency.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        lock_unpoisoned(&self.scripted).push_back(Ok(reply.into()));
    }

    pub fn push_error(&self, error: CompletionError) {
        lock_unpoisoned(&self.scripted).push_back(Err(error));
    }

    /// Requests received so far, oldest first.
    pub fn observed_requests(&self) -> Vec<CompletionRequest> {
        lock_unpoisoned(&self.observed).clone()
    }

    fn default_reply(request: &CompletionRequest) -> String {
        match request.last_user_content() {
            Some(content) => format!("You said: {content}"),
            None => "Hello from the mock provider.".to_string(),
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatProvider for MockProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: MOCK_PROVIDER_ID.to_string(),
            model_id: "mock".to_string(),
        }
    }

    fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }

        let outcome = lock_unpoisoned(&self.scripted).pop_front();
        let reply = match outcome {
            Some(outcome) => outcome,
            None => Ok(Self::default_reply(&request)),
        };
        lock_unpoisoned(&self.observed).push(request);
        reply
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
