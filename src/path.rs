//! Looping spline paths sampled by normalized arc length.
//!
//! Curves are uniform Catmull-Rom splines through their control points. A
//! cumulative arc-length table is built once at construction so that `t`
//! moves at constant speed along the path regardless of control point spacing.

use glam::Vec3;
use thiserror::Error;

/// Arc-length table resolution per spline segment
const DIVISIONS_PER_SEGMENT: usize = 32;

/// Errors raised while building a curve
#[derive(Debug, Error, PartialEq)]
pub enum CurveError {
    #[error("curve needs at least one control point")]
    Empty,

    #[error("control point {index} is not finite: {point:?}")]
    NonFinite { index: usize, point: Vec3 },
}

/// Wrap a path parameter into [0, 1)
pub fn wrap_unit(t: f32) -> f32 {
    let wrapped = t.rem_euclid(1.0);
    // rem_euclid rounds tiny negatives up to exactly 1.0
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

/// Immutable Catmull-Rom spline, open or closed
#[derive(Debug, Clone)]
pub struct Curve {
    points: Vec<Vec3>,
    closed: bool,
    /// Cumulative arc length at each table division (first entry 0)
    lengths: Vec<f32>,
}

impl Curve {
    /// Build a curve through `points`
    pub fn new(points: Vec<Vec3>, closed: bool) -> Result<Self, CurveError> {
        if points.is_empty() {
            return Err(CurveError::Empty);
        }
        if let Some((index, &point)) = points.iter().enumerate().find(|(_, p)| !p.is_finite()) {
            return Err(CurveError::NonFinite { index, point });
        }

        let mut curve = Self {
            points,
            closed,
            lengths: Vec::new(),
        };
        curve.lengths = curve.build_length_table();
        Ok(curve)
    }

    /// Build from config-style arrays
    pub fn from_arrays(points: &[[f32; 3]], closed: bool) -> Result<Self, CurveError> {
        Self::new(points.iter().map(|&p| Vec3::from_array(p)).collect(), closed)
    }

    /// Total arc length (world units)
    pub fn length(&self) -> f32 {
        self.lengths.last().copied().unwrap_or(0.0)
    }

    /// Position at normalized arc length `t`
    ///
    /// `t` wraps modulo 1 (negative values included). On an open curve
    /// `t == 1.0` exactly yields the last control point.
    pub fn point_at(&self, t: f32) -> Vec3 {
        if !self.closed && t == 1.0 {
            return self.points[self.points.len() - 1];
        }
        self.point_at_u(self.arc_to_u(wrap_unit(t)))
    }

    /// Look-at point `dt` ahead of `t` along the curve (wrapped)
    pub fn lookahead(&self, t: f32, dt: f32) -> Vec3 {
        self.point_at(wrap_unit(t) + dt)
    }

    /// Unit tangent at normalized arc length `t`
    pub fn tangent_at(&self, t: f32) -> Vec3 {
        let u = self.arc_to_u(wrap_unit(t));
        let (p0, p1, p2, p3, s) = self.segment(u);

        let derivative = 0.5
            * ((p2 - p0)
                + 2.0 * (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * s
                + 3.0 * (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * s * s);

        derivative.try_normalize().unwrap_or(Vec3::Z)
    }

    fn segment_count(&self) -> usize {
        let n = self.points.len();
        if self.closed {
            n
        } else {
            n.saturating_sub(1)
        }
    }

    /// Control point lookup with wrap (closed) or reflected phantom ends (open)
    fn control(&self, index: isize) -> Vec3 {
        let n = self.points.len() as isize;
        if self.closed {
            return self.points[index.rem_euclid(n) as usize];
        }
        if index < 0 {
            // Phantom point mirrors the first interior point
            let first = self.points[0];
            let next = self.points[1.min(n - 1) as usize];
            return 2.0 * first - next;
        }
        if index >= n {
            let last = self.points[(n - 1) as usize];
            let prev = self.points[(n - 2).max(0) as usize];
            return 2.0 * last - prev;
        }
        self.points[index as usize]
    }

    /// Four control points and local parameter for spline parameter `u` in [0, 1]
    fn segment(&self, u: f32) -> (Vec3, Vec3, Vec3, Vec3, f32) {
        let segments = self.segment_count();
        if segments == 0 {
            let p = self.points[0];
            return (p, p, p, p, 0.0);
        }

        let scaled = u.clamp(0.0, 1.0) * segments as f32;
        let index = (scaled.floor() as usize).min(segments - 1);
        let s = scaled - index as f32;
        let i = index as isize;

        (
            self.control(i - 1),
            self.control(i),
            self.control(i + 1),
            self.control(i + 2),
            s,
        )
    }

    /// Evaluate the spline at raw (non arc-length) parameter `u`
    fn point_at_u(&self, u: f32) -> Vec3 {
        let (p0, p1, p2, p3, s) = self.segment(u);
        let s2 = s * s;
        let s3 = s2 * s;

        0.5 * ((2.0 * p1)
            + (p2 - p0) * s
            + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * s2
            + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * s3)
    }

    fn build_length_table(&self) -> Vec<f32> {
        let divisions = (self.segment_count() * DIVISIONS_PER_SEGMENT).max(1);
        let mut lengths = Vec::with_capacity(divisions + 1);
        let mut total = 0.0;
        let mut prev = self.point_at_u(0.0);
        lengths.push(0.0);

        for i in 1..=divisions {
            let point = self.point_at_u(i as f32 / divisions as f32);
            total += point.distance(prev);
            lengths.push(total);
            prev = point;
        }
        lengths
    }

    /// Map normalized arc length to spline parameter via the length table
    fn arc_to_u(&self, t: f32) -> f32 {
        let total = self.length();
        if total <= f32::EPSILON {
            return t;
        }

        let target = t * total;
        let divisions = self.lengths.len() - 1;

        // Last table entry not exceeding the target
        let i = self
            .lengths
            .partition_point(|&l| l <= target)
            .saturating_sub(1)
            .min(divisions - 1);

        let start = self.lengths[i];
        let span = self.lengths[i + 1] - start;
        let frac = if span > 0.0 { (target - start) / span } else { 0.0 };

        (i as f32 + frac) / divisions as f32
    }
}
