use crate::models::SubmissionOutcome;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Auto-dismiss delay for the status banner.
pub const DEFAULT_BANNER_TTL: Duration = Duration::from_secs(5);

/// What the form's status banner currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BannerState {
    Idle,
    Success,
    Error { message: String },
}

impl From<&SubmissionOutcome> for BannerState {
    fn from(outcome: &SubmissionOutcome) -> Self {
        match outcome {
            SubmissionOutcome::Success => BannerState::Success,
            SubmissionOutcome::Failure(err) => BannerState::Error {
                message: err.message().to_string(),
            },
        }
    }
}

struct BannerSlot {
    state: BannerState,
    /// Bumped on every change so a timer that already woke cannot clear a newer message.
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

impl BannerSlot {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for BannerSlot {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

/// Status banner for one form instance.
///
/// Cloning shares the banner. The dismiss timer only holds a weak reference,
/// and dropping the last handle aborts it.
#[derive(Clone)]
pub struct StatusBanner {
    slot: Arc<Mutex<BannerSlot>>,
    ttl: Duration,
}

impl StatusBanner {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(BannerSlot {
                state: BannerState::Idle,
                generation: 0,
                timer: None,
            })),
            ttl,
        }
    }

    pub fn current(&self) -> BannerState {
        self.lock().state.clone()
    }

    /// Clears any visible message and cancels its pending dismiss timer.
    pub fn begin_submission(&self) {
        let mut slot = self.lock();
        slot.cancel_timer();
        slot.generation += 1;
        slot.state = BannerState::Idle;
    }

    /// Shows the outcome and schedules it to clear after the TTL.
    ///
    /// Must be called from within a tokio runtime.
    pub fn show(&self, outcome: &SubmissionOutcome) {
        let mut slot = self.lock();
        slot.cancel_timer();
        slot.generation += 1;
        slot.state = BannerState::from(outcome);

        let generation = slot.generation;
        let weak = Arc::downgrade(&self.slot);
        let ttl = self.ttl;
        slot.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            dismiss(weak, generation);
        }));
    }

    fn lock(&self) -> MutexGuard<'_, BannerSlot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn dismiss(slot: Weak<Mutex<BannerSlot>>, generation: u64) {
    let Some(slot) = slot.upgrade() else {
        return;
    };
    let mut slot = slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if slot.generation == generation {
        slot.state = BannerState::Idle;
        slot.timer = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SubmissionError;

    fn failure(msg: &str) -> SubmissionOutcome {
        SubmissionOutcome::Failure(SubmissionError::Transport(msg.to_string()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_banner_clears_after_ttl() {
        let banner = StatusBanner::new(DEFAULT_BANNER_TTL);
        banner.show(&SubmissionOutcome::Success);
        assert_eq!(banner.current(), BannerState::Success);

        tokio::time::sleep(Duration::from_millis(4_900)).await;
        assert_eq!(banner.current(), BannerState::Success);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(banner.current(), BannerState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_banner_carries_message() {
        let banner = StatusBanner::new(DEFAULT_BANNER_TTL);
        banner.show(&failure("offline"));
        assert_eq!(
            banner.current(),
            BannerState::Error {
                message: "offline".into()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_submission_cancels_pending_timer() {
        let banner = StatusBanner::new(DEFAULT_BANNER_TTL);
        banner.show(&failure("first"));

        tokio::time::sleep(Duration::from_secs(3)).await;
        banner.begin_submission();
        assert_eq!(banner.current(), BannerState::Idle);

        banner.show(&SubmissionOutcome::Success);

        // The first timer would have fired here.
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(banner.current(), BannerState::Success);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(banner.current(), BannerState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_banner_does_not_leak_timer() {
        let banner = StatusBanner::new(DEFAULT_BANNER_TTL);
        banner.show(&SubmissionOutcome::Success);
        let weak = Arc::downgrade(&banner.slot);
        drop(banner);

        assert!(weak.upgrade().is_none());
        tokio::time::sleep(Duration::from_secs(6)).await;
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_value(BannerState::Error {
            message: "nope".into(),
        })
        .unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "nope");
        assert_eq!(
            serde_json::to_value(BannerState::Idle).unwrap()["status"],
            "idle"
        );
    }
}
