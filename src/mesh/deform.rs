//! Closed-form vertex displacement driven by a scalar intensity.
//!
//! `noise = sin(x·k + time) · cos(y·k + time) · (intensity / D)` and every
//! axis of the vertex is scaled by `1 + noise`. Zero intensity is the identity.

use glam::Vec3;

use super::RestShape;
use crate::params::DeformParams;

/// Displacement factor for one rest vertex
#[inline]
fn noise_at(p: Vec3, time: f32, intensity: f32, params: &DeformParams) -> f32 {
    let k = params.spatial_frequency;
    (p.x * k + time).sin() * (p.y * k + time).cos() * (intensity / params.damping)
}

/// Displace `rest` into `out` without allocating
///
/// `out` must have the same length as `rest`; extra elements on either side
/// are left untouched.
pub fn deform_into(rest: &[Vec3], out: &mut [Vec3], time: f32, intensity: f32, params: &DeformParams) {
    for (dst, &p) in out.iter_mut().zip(rest) {
        *dst = p * (1.0 + noise_at(p, time, intensity, params));
    }
}

/// Allocating convenience wrapper around [`deform_into`]
pub fn deform(rest: &[Vec3], time: f32, intensity: f32, params: &DeformParams) -> Vec<Vec3> {
    let mut out = vec![Vec3::ZERO; rest.len()];
    deform_into(rest, &mut out, time, intensity, params);
    out
}

/// Owns the rest shape and the reusable displaced buffer
pub struct DeformationEngine {
    rest: RestShape,
    displaced: Vec<Vec3>,
    params: DeformParams,
}

impl DeformationEngine {
    pub fn new(rest: RestShape, params: DeformParams) -> Self {
        Self {
            displaced: rest.positions().to_vec(),
            rest,
            params,
        }
    }

    /// Recompute the displaced shape in place for this tick
    pub fn update(&mut self, time: f32, intensity: f32) {
        deform_into(
            self.rest.positions(),
            &mut self.displaced,
            time,
            intensity,
            &self.params,
        );
    }

    /// Reset the displaced shape to the rest shape
    pub fn relax(&mut self) {
        self.displaced.copy_from_slice(self.rest.positions());
    }

    pub fn rest(&self) -> &RestShape {
        &self.rest
    }

    /// Current displaced vertices (read-only view for the renderer)
    pub fn displaced(&self) -> &[Vec3] {
        &self.displaced
    }

    /// Largest per-vertex distance from the rest shape
    pub fn max_displacement(&self) -> f32 {
        self.rest
            .positions()
            .iter()
            .zip(&self.displaced)
            .map(|(r, d)| r.distance(*d))
            .fold(0.0, f32::max)
    }
}
