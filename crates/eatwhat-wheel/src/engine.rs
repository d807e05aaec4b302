//! The elimination state machine.
//!
//! ```text
//!            spin (pool >= 1)          complete_spin
//!   Idle ───────────────────▶ Spinning ─────────────▶ AwaitingDecision
//!    ▲  ▲                       ▲                        │     │
//!    │  └──── cancel_spin ──────┘        reject (>1 left)│     │ confirm
//!    │                          └────────────────────────┘     │
//!    │◀──────────── reject (<=1 left, pool restored) ──────────┤
//!    └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Requests that do not fit the current state are ignored and reported as
//! `None`/[`RejectOutcome::Ignored`]; they never panic or mutate state.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use eatwhat_core::Candidate;
use rand::Rng;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineState {
    Idle,
    Spinning { target_index: usize, pool_size: usize },
    AwaitingDecision { chosen: Candidate },
}

impl EngineState {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            EngineState::Idle => "idle",
            EngineState::Spinning { .. } => "spinning",
            EngineState::AwaitingDecision { .. } => "awaiting a decision",
        }
    }
}

/// One spin sequence: the pool it started from and the ids rejected so far.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub original_pool: Vec<Candidate>,
    pub excluded_ids: HashSet<i64>,
}

impl Session {
    fn new(original_pool: Vec<Candidate>) -> Self {
        Self {
            id: Uuid::new_v4(),
            original_pool,
            excluded_ids: HashSet::new(),
        }
    }
}

/// Index drawn for a new round, into the eligible pool at the time of the draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinRequest {
    pub target_index: usize,
    pub pool_size: usize,
}

/// Emitted when the user accepts a result. The caller decides what to do
/// with it (write history, show a message).
#[derive(Debug, Clone, PartialEq)]
pub struct Confirmation {
    pub session_id: Uuid,
    pub candidate: Candidate,
    /// Candidates rejected earlier in the session.
    pub rejected: usize,
    pub confirmed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectOutcome {
    /// The result was excluded and a new round started on the reduced pool.
    Respin(SpinRequest),
    /// Too few candidates were left, so the full pool came back and the
    /// engine is idle. No automatic spin.
    Restored { pool_size: usize },
    /// There was no pending result to reject.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct SelectionEngine {
    session: Session,
    state: EngineState,
}

impl SelectionEngine {
    /// Starts idle on `pool`. Later duplicates of an id are dropped so that
    /// exclusion by id stays exact.
    #[must_use]
    pub fn new(pool: Vec<Candidate>) -> Self {
        Self {
            session: Session::new(dedupe_ids(pool)),
            state: EngineState::Idle,
        }
    }

    #[must_use]
    pub fn state(&self) -> &EngineState {
        &self.state
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Original pool minus exclusions, in original order.
    #[must_use]
    pub fn eligible(&self) -> Vec<&Candidate> {
        self.session
            .original_pool
            .iter()
            .filter(|c| !self.session.excluded_ids.contains(&c.id))
            .collect()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.session.original_pool.len() - self.session.excluded_ids.len()
    }

    /// At most one option is left out of a larger pool.
    #[must_use]
    pub fn low_pool(&self) -> bool {
        self.remaining() <= 1 && self.session.original_pool.len() > 1
    }

    /// Draws a target uniformly over the eligible pool and enters `Spinning`.
    ///
    /// Returns `None` (no-op) unless idle with at least one eligible candidate.
    pub fn spin<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<SpinRequest> {
        if !matches!(self.state, EngineState::Idle) {
            tracing::debug!(state = self.state.name(), "spin ignored");
            return None;
        }
        let pool_size = self.remaining();
        if pool_size == 0 {
            tracing::debug!("spin ignored: empty pool");
            return None;
        }
        let target_index = rng.random_range(0..pool_size);
        self.state = EngineState::Spinning {
            target_index,
            pool_size,
        };
        tracing::debug!(session_id = %self.session.id, target_index, pool_size, "spin started");
        Some(SpinRequest {
            target_index,
            pool_size,
        })
    }

    /// Called when the animation has landed: `Spinning` → `AwaitingDecision`.
    pub fn complete_spin(&mut self) -> Option<&Candidate> {
        let EngineState::Spinning { target_index, .. } = self.state else {
            tracing::debug!(state = self.state.name(), "complete_spin ignored");
            return None;
        };
        let chosen = self.eligible().get(target_index).map(|c| (*c).clone())?;
        self.state = EngineState::AwaitingDecision { chosen };
        match &self.state {
            EngineState::AwaitingDecision { chosen } => Some(chosen),
            _ => None,
        }
    }

    /// Abandons an in-flight round (animation cancelled): `Spinning` → `Idle`.
    pub fn cancel_spin(&mut self) -> bool {
        if matches!(self.state, EngineState::Spinning { .. }) {
            self.state = EngineState::Idle;
            true
        } else {
            false
        }
    }

    /// Accepts the pending result, ends the session, and starts a fresh one
    /// on the same original pool.
    pub fn confirm(&mut self) -> Option<Confirmation> {
        if !matches!(self.state, EngineState::AwaitingDecision { .. }) {
            tracing::debug!(state = self.state.name(), "confirm ignored");
            return None;
        }
        let EngineState::AwaitingDecision { chosen } =
            std::mem::replace(&mut self.state, EngineState::Idle)
        else {
            return None;
        };
        let confirmation = Confirmation {
            session_id: self.session.id,
            candidate: chosen,
            rejected: self.session.excluded_ids.len(),
            confirmed_at: Utc::now(),
        };
        tracing::info!(
            session_id = %confirmation.session_id,
            candidate_id = confirmation.candidate.id,
            rejected = confirmation.rejected,
            "result confirmed"
        );
        let pool = std::mem::take(&mut self.session.original_pool);
        self.session = Session::new(pool);
        Some(confirmation)
    }

    /// Excludes the pending result. Restores the full pool when one or no
    /// candidate would remain; otherwise immediately spins again.
    pub fn reject<R: Rng + ?Sized>(&mut self, rng: &mut R) -> RejectOutcome {
        let EngineState::AwaitingDecision { chosen } = &self.state else {
            tracing::debug!(state = self.state.name(), "reject ignored");
            return RejectOutcome::Ignored;
        };
        self.session.excluded_ids.insert(chosen.id);
        self.state = EngineState::Idle;

        if self.remaining() <= 1 {
            self.session.excluded_ids.clear();
            let pool_size = self.session.original_pool.len();
            tracing::info!(session_id = %self.session.id, pool_size, "pool exhausted; restored");
            return RejectOutcome::Restored { pool_size };
        }

        match self.spin(rng) {
            Some(request) => RejectOutcome::Respin(request),
            None => RejectOutcome::Ignored,
        }
    }

    /// Brings back every rejected candidate. Only allowed while idle.
    pub fn restore(&mut self) -> bool {
        if !matches!(self.state, EngineState::Idle) {
            tracing::debug!(state = self.state.name(), "restore ignored");
            return false;
        }
        self.session.excluded_ids.clear();
        true
    }

    /// Swaps in a new pool (e.g. after a fresh fetch) and starts a new
    /// session. Refused while a round is spinning; a pending result is
    /// discarded.
    pub fn replace_pool(&mut self, pool: Vec<Candidate>) -> bool {
        if matches!(self.state, EngineState::Spinning { .. }) {
            tracing::debug!("replace_pool ignored while spinning");
            return false;
        }
        self.state = EngineState::Idle;
        self.session = Session::new(dedupe_ids(pool));
        true
    }
}

fn dedupe_ids(pool: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen = HashSet::with_capacity(pool.len());
    let before = pool.len();
    let pool: Vec<Candidate> = pool.into_iter().filter(|c| seen.insert(c.id)).collect();
    if pool.len() != before {
        tracing::warn!(dropped = before - pool.len(), "dropped candidates with duplicate ids");
    }
    pool
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
