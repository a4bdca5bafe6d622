use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Fixed delay between the last keystroke and the roster request.
pub const SEARCH_DELAY: Duration = Duration::from_millis(300);

/// Collapses bursts of search input into one request.
///
/// Each call to [`settle`](Self::settle) supersedes the ones before it. A
/// request already sent is never cancelled, so a slow stale response can
/// still land after a newer one.
#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    delay: Duration,
    latest: Arc<AtomicU64>,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(SEARCH_DELAY)
    }
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, latest: Arc::new(AtomicU64::new(0)) }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits out the delay and returns `input` if nothing newer arrived meanwhile.
    pub async fn settle(&self, input: String) -> Option<String> {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        if self.latest.load(Ordering::SeqCst) == ticket {
            Some(input)
        } else {
            tracing::trace!(input = %input, "search input superseded");
            None
        }
    }
}
