//! Ties the selection engine to the animation: draw, animate, land.

use eatwhat_core::Candidate;
use rand::Rng;
use tokio::sync::oneshot;

use crate::engine::{Confirmation, EngineState, RejectOutcome, SelectionEngine, SpinRequest};
use crate::error::WheelError;
use crate::geometry::{plan_spin, random_extra_turns, SpinPlan};
use crate::scheduler::{AnimationScheduler, FrameSink, SpinHandle};

/// What a reject led to.
#[derive(Debug, Clone, PartialEq)]
pub enum RejectResult {
    /// A new round ran on the reduced pool and landed here.
    Chosen(Candidate),
    /// The pool was restored; the wheel is idle again.
    Restored { pool_size: usize },
}

/// Owns one animated round. Dropping it before the round lands stops the
/// animation and returns the engine to idle.
struct RoundGuard<'a> {
    engine: &'a mut SelectionEngine,
    handle: SpinHandle,
}

impl Drop for RoundGuard<'_> {
    fn drop(&mut self) {
        self.handle.cancel();
        if self.engine.cancel_spin() {
            tracing::debug!("spin round abandoned; engine reset");
        }
    }
}

/// A wheel with its own rotation, engine and scheduler.
#[derive(Debug)]
pub struct Wheel {
    engine: SelectionEngine,
    scheduler: AnimationScheduler,
    rotation_deg: f64,
}

impl Wheel {
    #[must_use]
    pub fn new(engine: SelectionEngine, scheduler: AnimationScheduler) -> Self {
        Self {
            engine,
            scheduler,
            rotation_deg: 0.0,
        }
    }

    #[must_use]
    pub fn engine(&self) -> &SelectionEngine {
        &self.engine
    }

    /// Current absolute rotation in degrees.
    #[must_use]
    pub fn rotation(&self) -> f64 {
        self.rotation_deg
    }

    /// Runs one elimination round and returns the candidate it landed on.
    /// Dropping the future before it resolves cancels the round and leaves
    /// the engine idle.
    ///
    /// # Errors
    ///
    /// [`WheelError::EmptyPool`] when nothing is eligible,
    /// [`WheelError::InvalidState`] unless idle, and [`WheelError::Cancelled`]
    /// if the animation is cancelled.
    pub async fn spin_round<R, S>(&mut self, rng: &mut R, sink: S) -> Result<Candidate, WheelError>
    where
        R: Rng + ?Sized,
        S: FrameSink,
    {
        let Some(request) = self.engine.spin(rng) else {
            return Err(self.refusal("spin"));
        };
        let extra_turns = random_extra_turns(rng);
        self.animate(request, extra_turns, sink).await
    }

    /// Accepts the pending result.
    ///
    /// # Errors
    ///
    /// [`WheelError::InvalidState`] when no result is pending.
    pub fn confirm(&mut self) -> Result<Confirmation, WheelError> {
        self.engine.confirm().ok_or_else(|| self.refusal("confirm"))
    }

    /// Rejects the pending result and, unless the pool is restored, runs the
    /// next round straight away.
    ///
    /// # Errors
    ///
    /// [`WheelError::InvalidState`] when no result is pending, and
    /// [`WheelError::Cancelled`] if the follow-up animation is cancelled.
    pub async fn reject<R, S>(&mut self, rng: &mut R, sink: S) -> Result<RejectResult, WheelError>
    where
        R: Rng + ?Sized,
        S: FrameSink,
    {
        match self.engine.reject(rng) {
            RejectOutcome::Respin(request) => {
                let extra_turns = random_extra_turns(rng);
                let chosen = self.animate(request, extra_turns, sink).await?;
                Ok(RejectResult::Chosen(chosen))
            }
            RejectOutcome::Restored { pool_size } => Ok(RejectResult::Restored { pool_size }),
            RejectOutcome::Ignored => Err(self.refusal("reject")),
        }
    }

    fn refusal(&self, action: &'static str) -> WheelError {
        match self.engine.state() {
            EngineState::Idle if self.engine.remaining() == 0 => WheelError::EmptyPool,
            state => WheelError::InvalidState {
                action,
                state: state.name(),
            },
        }
    }

    async fn animate<S: FrameSink>(
        &mut self,
        request: SpinRequest,
        extra_turns: u32,
        sink: S,
    ) -> Result<Candidate, WheelError> {
        let plan: SpinPlan = match plan_spin(
            request.target_index,
            request.pool_size,
            self.rotation_deg,
            extra_turns,
        ) {
            Ok(plan) => plan,
            Err(err) => {
                self.engine.cancel_spin();
                return Err(err);
            }
        };
        tracing::debug!(
            target_index = plan.target_index,
            pool_size = plan.pool_size,
            end_deg = plan.end_deg,
            "animating spin"
        );

        let (tx, rx) = oneshot::channel();
        let mut round = RoundGuard {
            engine: &mut self.engine,
            handle: self.scheduler.start(
                plan.start_deg,
                plan.end_deg,
                sink,
                move |angle| {
                    let _ = tx.send(angle);
                },
            ),
        };

        let Ok(angle) = rx.await else {
            return Err(WheelError::Cancelled);
        };

        self.rotation_deg = angle;
        let chosen = round.engine.complete_spin().cloned();
        chosen.ok_or(WheelError::InvalidState {
            action: "complete a spin",
            state: "not spinning",
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use eatwhat_core::GeoPoint;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal::Decimal;

    use super::*;
    use crate::geometry::slice_under_pointer;
    use crate::scheduler::{AnimationConfig, Frame};

    fn candidate(id: i64) -> Candidate {
        Candidate {
            id,
            name: format!("R{id}"),
            address: format!("{id} Rd"),
            category_id: 1,
            rating: Decimal::new(40, 1),
            price_label: "￥30".to_string(),
            tags: Vec::new(),
            image_url: None,
            description: "restaurant".to_string(),
            location: GeoPoint::new(0.0, 0.0),
            distance_meters: None,
        }
    }

    fn wheel(n: i64) -> Wheel {
        Wheel::new(
            SelectionEngine::new((1..=n).map(candidate).collect()),
            AnimationScheduler::default(),
        )
    }

    fn noop(_: Frame) {}

    #[tokio::test(start_paused = true)]
    async fn pointer_lands_on_the_chosen_candidate_every_round() {
        let mut wheel = wheel(7);
        let mut rng = StdRng::seed_from_u64(31);

        for _ in 0..20 {
            let eligible: Vec<i64> = wheel.engine().eligible().iter().map(|c| c.id).collect();
            let chosen = wheel.spin_round(&mut rng, noop).await.unwrap();
            let under = slice_under_pointer(wheel.rotation(), eligible.len()).unwrap();
            assert_eq!(eligible[under], chosen.id);
            wheel.confirm().unwrap();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn reject_respins_on_the_reduced_pool() {
        let mut wheel = wheel(4);
        let mut rng = StdRng::seed_from_u64(5);

        let first = wheel.spin_round(&mut rng, noop).await.unwrap();
        let RejectResult::Chosen(second) = wheel.reject(&mut rng, noop).await.unwrap() else {
            panic!("expected a respin");
        };
        assert_ne!(first.id, second.id);
        let eligible: Vec<i64> = wheel.engine().eligible().iter().map(|c| c.id).collect();
        assert_eq!(eligible.len(), 3);
        let under = slice_under_pointer(wheel.rotation(), 3).unwrap();
        assert_eq!(eligible[under], second.id);
    }

    #[tokio::test(start_paused = true)]
    async fn two_rejections_on_three_restore_the_pool() {
        let mut wheel = wheel(3);
        let mut rng = StdRng::seed_from_u64(6);

        wheel.spin_round(&mut rng, noop).await.unwrap();
        assert!(matches!(
            wheel.reject(&mut rng, noop).await.unwrap(),
            RejectResult::Chosen(_)
        ));
        assert_eq!(
            wheel.reject(&mut rng, noop).await.unwrap(),
            RejectResult::Restored { pool_size: 3 }
        );
        assert_eq!(wheel.engine().eligible().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn refusals_are_typed() {
        let mut empty = wheel(0);
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(
            empty.spin_round(&mut rng, noop).await.unwrap_err(),
            WheelError::EmptyPool
        );

        let mut w = wheel(2);
        assert!(matches!(
            w.confirm(),
            Err(WheelError::InvalidState { action: "confirm", .. })
        ));
        assert!(matches!(
            w.reject(&mut rng, noop).await,
            Err(WheelError::InvalidState { action: "reject", .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_a_round_mid_spin_resets_the_engine() {
        let mut wheel = wheel(5);
        let mut rng = StdRng::seed_from_u64(8);
        let session = wheel.engine().session().id;

        let outcome = tokio::time::timeout(
            Duration::from_millis(500),
            wheel.spin_round(&mut rng, noop),
        )
        .await;
        assert!(outcome.is_err(), "round should still be spinning at 500 ms");

        assert_eq!(wheel.engine().state(), &EngineState::Idle);
        assert_eq!(wheel.engine().remaining(), 5);
        assert_eq!(wheel.engine().session().id, session);
        assert!(wheel.spin_round(&mut rng, noop).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_respin_keeps_earlier_rejections() {
        let mut wheel = wheel(4);
        let mut rng = StdRng::seed_from_u64(10);

        let first = wheel.spin_round(&mut rng, noop).await.unwrap();
        let outcome =
            tokio::time::timeout(Duration::from_millis(500), wheel.reject(&mut rng, noop)).await;
        assert!(outcome.is_err());

        assert_eq!(wheel.engine().state(), &EngineState::Idle);
        assert_eq!(wheel.engine().remaining(), 3);
        assert!(wheel.engine().session().excluded_ids.contains(&first.id));
    }

    #[tokio::test(start_paused = true)]
    async fn custom_timings_are_honoured() {
        let mut w = Wheel::new(
            SelectionEngine::new((1..=3).map(candidate).collect()),
            AnimationScheduler::new(AnimationConfig {
                duration: Duration::from_millis(100),
                settle_delay: Duration::from_millis(10),
                frame_interval: Duration::from_millis(10),
            }),
        );
        let mut rng = StdRng::seed_from_u64(9);
        let started = tokio::time::Instant::now();
        w.spin_round(&mut rng, noop).await.unwrap();
        assert!(started.elapsed() < Duration::from_millis(200));
    }
}
