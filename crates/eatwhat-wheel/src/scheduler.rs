//! Wall-clock driven spin animation.
//!
//! The displayed angle is recomputed from elapsed time on every frame, so a
//! late or skipped frame never shifts where the wheel stops. A run renders
//! the exact target angle, turns transitions off, waits the settle delay, and
//! only then calls its completion callback, and only if it was not cancelled
//! first.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::geometry::ease_out_cubic;

pub const SPIN_DURATION: Duration = Duration::from_millis(3000);
pub const SETTLE_DELAY: Duration = Duration::from_millis(200);
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub angle_deg: f64,
    /// Elapsed fraction in `[0, 1]`.
    pub progress: f64,
    /// `false` once the wheel has landed and must be drawn statically.
    pub transitioning: bool,
}

/// Rendering surface for animation frames.
pub trait FrameSink: Send + 'static {
    fn render(&mut self, frame: Frame);
}

impl<F> FrameSink for F
where
    F: FnMut(Frame) + Send + 'static,
{
    fn render(&mut self, frame: Frame) {
        self(frame);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationConfig {
    pub duration: Duration,
    pub settle_delay: Duration,
    pub frame_interval: Duration,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration: SPIN_DURATION,
            settle_delay: SETTLE_DELAY,
            frame_interval: FRAME_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationStatus {
    Running,
    Completed,
    Cancelled,
}

const RUNNING: u8 = 0;
const COMPLETED: u8 = 1;
const CANCELLED: u8 = 2;

fn decode(raw: u8) -> AnimationStatus {
    match raw {
        RUNNING => AnimationStatus::Running,
        COMPLETED => AnimationStatus::Completed,
        _ => AnimationStatus::Cancelled,
    }
}

/// Handle to one running animation.
#[derive(Debug)]
pub struct SpinHandle {
    status: Arc<AtomicU8>,
    task: JoinHandle<()>,
}

impl SpinHandle {
    /// Stops the animation. Returns `true` if this call cancelled it, `false`
    /// if it had already completed or been cancelled. Safe to call repeatedly.
    pub fn cancel(&self) -> bool {
        let cancelled = self
            .status
            .compare_exchange(RUNNING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if cancelled {
            self.task.abort();
            tracing::debug!("spin animation cancelled");
        }
        cancelled
    }

    #[must_use]
    pub fn status(&self) -> AnimationStatus {
        decode(self.status.load(Ordering::Acquire))
    }

    /// `true` once the animation can no longer render or complete.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished() || self.status() == AnimationStatus::Cancelled
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnimationScheduler {
    config: AnimationConfig,
}

impl AnimationScheduler {
    #[must_use]
    pub fn new(config: AnimationConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// Animates from `from_deg` to `target_deg` on a spawned tokio task and
    /// calls `on_complete(target_deg)` after the settle delay.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<S, C>(
        &self,
        from_deg: f64,
        target_deg: f64,
        mut sink: S,
        on_complete: C,
    ) -> SpinHandle
    where
        S: FrameSink,
        C: FnOnce(f64) + Send + 'static,
    {
        let status = Arc::new(AtomicU8::new(RUNNING));
        let config = self.config;
        let task_status = Arc::clone(&status);
        let running = move || task_status.load(Ordering::Acquire) == RUNNING;
        let completion_status = Arc::clone(&status);

        let task = tokio::spawn(async move {
            let started = Instant::now();
            let mut ticker = tokio::time::interval(config.frame_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                let progress = if config.duration.is_zero() {
                    1.0
                } else {
                    (started.elapsed().as_secs_f64() / config.duration.as_secs_f64()).min(1.0)
                };
                if progress >= 1.0 || !running() {
                    break;
                }
                sink.render(Frame {
                    angle_deg: from_deg + (target_deg - from_deg) * ease_out_cubic(progress),
                    progress,
                    transitioning: true,
                });
            }

            if !running() {
                return;
            }
            sink.render(Frame {
                angle_deg: target_deg,
                progress: 1.0,
                transitioning: true,
            });
            sink.render(Frame {
                angle_deg: target_deg,
                progress: 1.0,
                transitioning: false,
            });

            tokio::time::sleep(config.settle_delay).await;

            if completion_status
                .compare_exchange(RUNNING, COMPLETED, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                tracing::debug!(target_deg, "spin animation completed");
                on_complete(target_deg);
            }
        });

        SpinHandle { status, task }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    type Frames = Arc<Mutex<Vec<Frame>>>;

    fn recorder() -> (Frames, impl FrameSink) {
        let frames: Frames = Arc::new(Mutex::new(Vec::new()));
        let sink_frames = Arc::clone(&frames);
        (frames, move |f: Frame| sink_frames.lock().unwrap().push(f))
    }

    fn completion() -> (Arc<Mutex<Vec<f64>>>, impl FnOnce(f64) + Send + 'static) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        (calls, move |angle| sink.lock().unwrap().push(angle))
    }

    #[tokio::test(start_paused = true)]
    async fn lands_exactly_and_completes_once_after_settling() {
        let scheduler = AnimationScheduler::default();
        let (frames, sink) = recorder();
        let (calls, on_complete) = completion();

        let handle = scheduler.start(10.0, 2_295.0, sink, on_complete);

        tokio::time::sleep(SPIN_DURATION + Duration::from_millis(100)).await;
        assert!(calls.lock().unwrap().is_empty(), "fired before settle delay");

        tokio::time::sleep(SETTLE_DELAY).await;
        assert_eq!(calls.lock().unwrap().as_slice(), &[2_295.0]);
        assert_eq!(handle.status(), AnimationStatus::Completed);

        let frames = frames.lock().unwrap();
        let last = frames.last().unwrap();
        assert_eq!(last.angle_deg.to_bits(), 2_295.0_f64.to_bits());
        assert!(!last.transitioning);
        assert!(frames[..frames.len() - 1].iter().all(|f| f.transitioning));
        assert!(frames
            .windows(2)
            .all(|w| w[1].angle_deg >= w[0].angle_deg && w[1].progress >= w[0].progress));
        assert!(!handle.cancel(), "cancel after completion must not succeed");
    }

    #[tokio::test(start_paused = true)]
    async fn sparse_frames_still_land_on_target() {
        let scheduler = AnimationScheduler::new(AnimationConfig {
            frame_interval: Duration::from_millis(700),
            ..AnimationConfig::default()
        });
        let (frames, sink) = recorder();
        let (calls, on_complete) = completion();

        scheduler.start(0.0, 1_935.0, sink, on_complete);
        tokio::time::sleep(Duration::from_secs(5)).await;

        let frames = frames.lock().unwrap();
        // ticks at 0, 700, 1400, 2100, 2800 ms animate; 3500 ms lands
        assert_eq!(frames.iter().filter(|f| f.progress < 1.0).count(), 5);
        assert_eq!(frames.last().unwrap().angle_deg.to_bits(), 1_935.0_f64.to_bits());
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn displayed_angle_follows_wall_clock_easing() {
        let scheduler = AnimationScheduler::new(AnimationConfig {
            frame_interval: Duration::from_millis(1500),
            ..AnimationConfig::default()
        });
        let (frames, sink) = recorder();
        let (_calls, on_complete) = completion();

        scheduler.start(0.0, 1_000.0, sink, on_complete);
        tokio::time::sleep(Duration::from_secs(4)).await;

        let frames = frames.lock().unwrap();
        let halfway = frames
            .iter()
            .find(|f| (f.progress - 0.5).abs() < 1e-9)
            .expect("a frame at the halfway mark");
        assert!((halfway.angle_deg - 875.0).abs() < 1e-6);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_run_never_completes() {
        let scheduler = AnimationScheduler::default();
        let (frames, sink) = recorder();
        let (calls, on_complete) = completion();

        let handle = scheduler.start(0.0, 2_000.0, sink, on_complete);
        tokio::time::sleep(Duration::from_millis(1000)).await;

        assert!(handle.cancel());
        assert!(!handle.cancel(), "second cancel is a no-op");
        let rendered = frames.lock().unwrap().len();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(calls.lock().unwrap().is_empty());
        assert_eq!(frames.lock().unwrap().len(), rendered);
        assert_eq!(handle.status(), AnimationStatus::Cancelled);
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_during_settle_delay_suppresses_completion() {
        let scheduler = AnimationScheduler::default();
        let (_frames, sink) = recorder();
        let (calls, on_complete) = completion();

        let handle = scheduler.start(0.0, 720.0, sink, on_complete);
        tokio::time::sleep(SPIN_DURATION + Duration::from_millis(50)).await;

        assert!(handle.cancel());
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_duration_jumps_straight_to_target() {
        let scheduler = AnimationScheduler::new(AnimationConfig {
            duration: Duration::ZERO,
            settle_delay: Duration::ZERO,
            frame_interval: FRAME_INTERVAL,
        });
        let (frames, sink) = recorder();
        let (calls, on_complete) = completion();

        scheduler.start(5.0, 365.0, sink, on_complete);
        tokio::time::sleep(Duration::from_millis(50)).await;

        let frames = frames.lock().unwrap();
        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(|f| (f.angle_deg - 365.0).abs() < f64::EPSILON));
        assert_eq!(calls.lock().unwrap().as_slice(), &[365.0]);
    }
}
