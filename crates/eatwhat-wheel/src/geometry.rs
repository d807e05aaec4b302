//! Wheel geometry: slice layout, exact-landing rotation, and easing.
//!
//! Slice `i` of an `n`-slice wheel spans `[i * 360/n, (i + 1) * 360/n)`
//! degrees in wheel coordinates. The pointer sits at 0 degrees and the wheel
//! rotates clockwise, so a point at wheel angle `a` is under the pointer when
//! `(a + rotation) mod 360 == 0`.

use rand::Rng;

use crate::error::WheelError;

/// Extra full turns are drawn from `[EXTRA_TURNS_MIN, EXTRA_TURNS_MAX)`.
pub const EXTRA_TURNS_MIN: u32 = 5;
pub const EXTRA_TURNS_MAX: u32 = 8;

/// Everything needed to animate one spin so it lands on `target_index`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinPlan {
    pub target_index: usize,
    pub pool_size: usize,
    pub slice_deg: f64,
    /// Wheel-coordinate centre of the target slice.
    pub center_deg: f64,
    /// Rotation beyond the whole turns that brings the centre under the pointer.
    pub delta_deg: f64,
    pub extra_turns: u32,
    pub start_deg: f64,
    pub end_deg: f64,
}

impl SpinPlan {
    #[must_use]
    pub fn total_rotation(&self) -> f64 {
        self.end_deg - self.start_deg
    }

    /// Displayed absolute angle at elapsed fraction `progress`.
    #[must_use]
    pub fn angle_at(&self, progress: f64) -> f64 {
        if progress >= 1.0 {
            return self.end_deg;
        }
        self.start_deg + self.total_rotation() * ease_out_cubic(progress)
    }
}

/// Plans a spin from `current_rotation` that lands the centre of slice
/// `target_index` exactly under the pointer after `extra_turns` full turns.
///
/// `delta` is measured from the wheel's current orientation, so with the
/// wheel at rest on a multiple of 360 it is `(360 - center) mod 360`.
///
/// # Errors
///
/// [`WheelError::EmptyPool`] for `pool_size == 0` and
/// [`WheelError::TargetOutOfRange`] when `target_index >= pool_size`.
pub fn plan_spin(
    target_index: usize,
    pool_size: usize,
    current_rotation: f64,
    extra_turns: u32,
) -> Result<SpinPlan, WheelError> {
    if pool_size == 0 {
        return Err(WheelError::EmptyPool);
    }
    if target_index >= pool_size {
        return Err(WheelError::TargetOutOfRange {
            index: target_index,
            pool_size,
        });
    }

    #[allow(clippy::cast_precision_loss)]
    let slice_deg = 360.0 / pool_size as f64;
    #[allow(clippy::cast_precision_loss)]
    let center_deg = target_index as f64 * slice_deg + slice_deg / 2.0;
    let delta_deg = (360.0 - center_deg - current_rotation.rem_euclid(360.0)).rem_euclid(360.0);
    let end_deg = current_rotation + f64::from(extra_turns) * 360.0 + delta_deg;

    Ok(SpinPlan {
        target_index,
        pool_size,
        slice_deg,
        center_deg,
        delta_deg,
        extra_turns,
        start_deg: current_rotation,
        end_deg,
    })
}

/// Uniform whole number of extra turns in `[5, 8)`.
pub fn random_extra_turns<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.random_range(EXTRA_TURNS_MIN..EXTRA_TURNS_MAX)
}

/// `1 - (1 - p)^3`, with `p` clamped to `[0, 1]`.
#[must_use]
pub fn ease_out_cubic(progress: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powi(3)
}

/// Index of the slice under the pointer when the wheel shows `rotation_deg`.
#[must_use]
pub fn slice_under_pointer(rotation_deg: f64, pool_size: usize) -> Option<usize> {
    if pool_size == 0 {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let slice_deg = 360.0 / pool_size as f64;
    let wheel_angle = (-rotation_deg).rem_euclid(360.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let index = (wheel_angle / slice_deg).floor() as usize;
    Some(index.min(pool_size - 1))
}
