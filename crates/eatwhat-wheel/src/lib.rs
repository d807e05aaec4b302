//! Spin-wheel selection: a uniform draw over the eligible pool, rejection
//! with pool restoration, and a wall-clock animation that lands the pointer
//! on the drawn slice.

pub mod engine;
pub mod error;
pub mod geometry;
pub mod scheduler;
pub mod wheel;

pub use engine::{Confirmation, EngineState, RejectOutcome, SelectionEngine, Session, SpinRequest};
pub use error::WheelError;
pub use geometry::{
    ease_out_cubic, plan_spin, random_extra_turns, slice_under_pointer, SpinPlan, EXTRA_TURNS_MAX,
    EXTRA_TURNS_MIN,
};
pub use scheduler::{
    AnimationConfig, AnimationScheduler, AnimationStatus, Frame, FrameSink, SpinHandle,
    FRAME_INTERVAL, SETTLE_DELAY, SPIN_DURATION,
};
pub use wheel::{RejectResult, Wheel};
