use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use chat_provider::{ChatProvider, CompletionError, CompletionRequest};
use cog_tui::RuntimeHandle;
use tracing::debug;

use crate::app::HostOps;
use crate::requests::{CompletionEvent, RequestTag};

/// [`HostOps`] backed by the terminal runtime.
///
/// Each completion runs on its own worker thread and re-enters the loop as a
/// [`CompletionEvent`]. Results that arrive after the loop stopped are dropped.
pub struct CompletionHost {
    provider: Arc<dyn ChatProvider>,
    runtime_handle: RuntimeHandle<CompletionEvent>,
}

impl CompletionHost {
    pub fn new(
        provider: Arc<dyn ChatProvider>,
        runtime_handle: RuntimeHandle<CompletionEvent>,
    ) -> Self {
        Self {
            provider,
            runtime_handle,
        }
    }
}

impl HostOps for CompletionHost {
    fn spawn_completion(
        &mut self,
        tag: RequestTag,
        request: CompletionRequest,
    ) -> Result<(), String> {
        let provider = Arc::clone(&self.provider);
        let runtime_handle = self.runtime_handle.clone();
        thread::Builder::new()
            .name(format!("cog-completion-{}", tag.sequence()))
            .spawn(move || {
                let outcome = catch_unwind(AssertUnwindSafe(|| provider.complete(request)))
                    .unwrap_or_else(|_| {
                        Err(CompletionError::Other("provider panicked".to_string()))
                    });
                let sequence = tag.sequence();
                if !runtime_handle.dispatch(CompletionEvent { tag, outcome }) {
                    debug!(sequence, "completion arrived after shutdown, discarding");
                }
            })
            .map(|_| ())
            .map_err(|error| format!("failed to start completion worker: {error}"))
    }

    fn request_render(&mut self) {
        self.runtime_handle.request_render();
    }

    fn request_stop(&mut self) {
        self.runtime_handle.request_stop();
    }
}
