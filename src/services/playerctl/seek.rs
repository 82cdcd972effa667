use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::timeout,
};
use tracing::{debug, warn};

use super::{control::PlayerctlControl, error::PlayerctlError};

/// Default window in which consecutive seek requests are merged.
pub const DEFAULT_SEEK_DEBOUNCE: Duration = Duration::from_millis(250);

/// Shared "seek in flight" marker.
///
/// Read by the position clock to stop extrapolating while a seek is pending.
#[derive(Debug, Clone, Default)]
pub struct SeekFlag(Arc<AtomicBool>);

impl SeekFlag {
    /// Create a cleared flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a seek is currently executing.
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Set the flag, or return `None` if it was already set.
    ///
    /// The flag is cleared when the returned guard drops, whatever the outcome
    /// of the seek.
    pub fn try_acquire(&self) -> Option<SeekGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SeekGuard(self.clone()))
    }
}

/// Clears its [`SeekFlag`] on drop.
#[derive(Debug)]
pub struct SeekGuard(SeekFlag);

impl Drop for SeekGuard {
    fn drop(&mut self) {
        (self.0).0.store(false, Ordering::Release);
    }
}

/// Something that can jump to an absolute position.
#[async_trait]
pub trait SeekTarget: Send + Sync + 'static {
    /// Move playback to `position_milli`.
    async fn seek_to(&self, position_milli: i64) -> Result<(), PlayerctlError>;
}

#[async_trait]
impl SeekTarget for PlayerctlControl {
    async fn seek_to(&self, position_milli: i64) -> Result<(), PlayerctlError> {
        self.set_position(position_milli).await
    }
}

/// Coalesces seek-bar drags into single absolute seeks.
///
/// Requests arriving within the debounce window of each other collapse into
/// the last one. While that seek executes, new requests are rejected.
pub struct SeekController {
    requests: mpsc::UnboundedSender<i64>,
    flag: SeekFlag,
    worker: JoinHandle<()>,
}

impl SeekController {
    /// Start the seek worker on the current runtime.
    pub fn spawn<T: SeekTarget>(target: T, debounce: Duration) -> Self {
        Self::with_flag(target, debounce, SeekFlag::new())
    }

    /// Start the seek worker using an existing flag.
    pub fn with_flag<T: SeekTarget>(target: T, debounce: Duration, flag: SeekFlag) -> Self {
        let (requests, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(target, debounce, rx, flag.clone()));

        Self {
            requests,
            flag,
            worker,
        }
    }

    /// Flag that is set while a seek executes.
    pub fn flag(&self) -> SeekFlag {
        self.flag.clone()
    }

    /// Queue a seek to `position_milli`.
    ///
    /// Returns `false` when the request was dropped because a seek is already
    /// executing.
    pub fn request(&self, position_milli: i64) -> bool {
        if self.flag.is_set() {
            debug!(position_milli, "Seek already in flight, request dropped");
            return false;
        }
        self.requests.send(position_milli).is_ok()
    }
}

impl Drop for SeekController {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

async fn run_worker<T: SeekTarget>(
    target: T,
    debounce: Duration,
    mut rx: mpsc::UnboundedReceiver<i64>,
    flag: SeekFlag,
) {
    while let Some(mut position_milli) = rx.recv().await {
        let mut merged = 0_usize;
        while let Ok(Some(next)) = timeout(debounce, rx.recv()).await {
            position_milli = next;
            merged += 1;
        }

        let Some(_guard) = flag.try_acquire() else {
            continue;
        };

        debug!(position_milli, merged, "Seeking");
        if let Err(e) = target.seek_to(position_milli).await {
            warn!(position_milli, error = %e, "Seek failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tokio::{sync::Notify, time::sleep};

    use super::*;

    #[derive(Clone, Default)]
    struct RecordingTarget {
        calls: Arc<Mutex<Vec<i64>>>,
        release: Option<Arc<Notify>>,
        fail: bool,
    }

    #[async_trait]
    impl SeekTarget for RecordingTarget {
        async fn seek_to(&self, position_milli: i64) -> Result<(), PlayerctlError> {
            self.calls.lock().unwrap().push(position_milli);
            if let Some(release) = &self.release {
                release.notified().await;
            }
            if self.fail {
                return Err(PlayerctlError::ExecutionError {
                    code: Some(1),
                    stderr: "No player could handle this command".to_string(),
                });
            }
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_requests_collapse_into_the_last() {
        let target = RecordingTarget::default();
        let calls = target.calls.clone();
        let seeker = SeekController::spawn(target, Duration::from_millis(250));

        for position in [1_000, 2_000, 3_000, 4_000, 5_000] {
            assert!(seeker.request(position));
            sleep(Duration::from_millis(50)).await;
        }
        sleep(Duration::from_millis(400)).await;

        assert_eq!(*calls.lock().unwrap(), vec![5_000]);
    }

    #[tokio::test(start_paused = true)]
    async fn requests_apart_are_separate_seeks() {
        let target = RecordingTarget::default();
        let calls = target.calls.clone();
        let seeker = SeekController::spawn(target, Duration::from_millis(100));

        seeker.request(10_000);
        sleep(Duration::from_millis(300)).await;
        seeker.request(20_000);
        sleep(Duration::from_millis(300)).await;

        assert_eq!(*calls.lock().unwrap(), vec![10_000, 20_000]);
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_seek_blocks_new_requests() {
        let release = Arc::new(Notify::new());
        let target = RecordingTarget {
            release: Some(release.clone()),
            ..Default::default()
        };
        let calls = target.calls.clone();
        let seeker = SeekController::spawn(target, Duration::from_millis(100));
        let flag = seeker.flag();

        seeker.request(30_000);
        sleep(Duration::from_millis(200)).await;

        assert!(flag.is_set());
        assert!(!seeker.request(40_000));

        release.notify_one();
        sleep(Duration::from_millis(10)).await;

        assert!(!flag.is_set());
        assert!(seeker.request(50_000));
        sleep(Duration::from_millis(200)).await;
        release.notify_one();
        sleep(Duration::from_millis(10)).await;

        assert_eq!(*calls.lock().unwrap(), vec![30_000, 50_000]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_seek_clears_the_flag() {
        let target = RecordingTarget {
            fail: true,
            ..Default::default()
        };
        let seeker = SeekController::spawn(target, Duration::from_millis(100));

        seeker.request(1_000);
        sleep(Duration::from_millis(200)).await;

        assert!(!seeker.flag().is_set());
        assert!(seeker.request(2_000));
    }

    #[test]
    fn guard_is_exclusive() {
        let flag = SeekFlag::new();
        let guard = flag.try_acquire();

        assert!(guard.is_some());
        assert!(flag.try_acquire().is_none());

        drop(guard);
        assert!(!flag.is_set());
    }
}
