//! Camera director: feature-driven travel along a looping spline path.

use glam::{Mat4, Vec3};

use crate::params::{CameraJourney, RenderConfig};
use crate::path::{wrap_unit, Curve};

/// |cos| between view direction and Y above which Y is unusable as up
const VERTICAL_LOOK_COS: f32 = 0.999;

/// Travel along the path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TravelState {
    /// Normalized arc-length position, always in [0, 1)
    pub progress: f32,

    /// Base advance per tick (fraction of the path)
    pub speed: f32,
}

impl TravelState {
    /// Advance by `speed + boost`, looping at the end of the path
    pub fn step(&mut self, boost: f32) {
        self.progress = wrap_unit(self.progress + self.speed + boost);
    }
}

/// Camera position and look-at target for one frame
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

impl CameraPose {
    /// Viewing direction, or -Z when the target sits on the camera
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position)
            .try_normalize()
            .unwrap_or(Vec3::NEG_Z)
    }

    /// Right-handed view matrix (Y up, the camera never rolls)
    ///
    /// Looking straight up or down swaps the up axis to Z so the basis
    /// stays finite.
    pub fn view_matrix(&self) -> Mat4 {
        let forward = self.forward();
        let up = if forward.dot(Vec3::Y).abs() > VERTICAL_LOOK_COS {
            Vec3::Z
        } else {
            Vec3::Y
        };
        Mat4::look_to_rh(self.position, forward, up)
    }

    /// Create view-projection matrix for rendering
    pub fn view_proj(&self, render_config: &RenderConfig) -> Mat4 {
        let proj = Mat4::perspective_rh(
            render_config.fov_degrees.to_radians(),
            render_config.aspect_ratio(),
            render_config.near_plane,
            render_config.far_plane,
        );
        proj * self.view_matrix()
    }
}

/// Moves the camera along a curve, faster when the driving feature is loud
pub struct CameraDirector {
    curve: Curve,
    params: CameraJourney,
    travel: TravelState,
    /// Smoothed position (None until the first tick snaps it)
    position: Option<Vec3>,
    pose: CameraPose,
}

impl CameraDirector {
    pub fn new(curve: Curve, params: CameraJourney) -> Self {
        let start = curve.point_at(0.0);
        let pose = CameraPose {
            position: start,
            target: curve.lookahead(0.0, params.lookahead),
        };
        Self {
            travel: TravelState {
                progress: 0.0,
                speed: params.speed,
            },
            position: None,
            curve,
            params,
            pose,
        }
    }

    /// Travel boost contributed by a feature value (monotonic, proportional)
    pub fn feature_boost(&self, feature: f32) -> f32 {
        feature.max(0.0) / self.params.feature_divisor
    }

    /// Advance one tick with `feature` driving extra speed
    pub fn advance(&mut self, feature: f32) -> CameraPose {
        let boost = self.feature_boost(feature);
        self.travel.step(boost);
        self.sample()
    }

    /// Advance one tick at base speed only
    pub fn advance_idle(&mut self) -> CameraPose {
        self.travel.step(0.0);
        self.sample()
    }

    /// Return to the start of the path and drop smoothing history
    pub fn restart(&mut self) {
        tracing::debug!("Camera journey restarted");
        self.travel.progress = 0.0;
        self.position = None;
    }

    pub fn travel(&self) -> TravelState {
        self.travel
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    fn sample(&mut self) -> CameraPose {
        let t = self.travel.progress;
        let sampled = self.curve.point_at(t);
        let target = self.curve.lookahead(t, self.params.lookahead);

        let position = match self.position {
            Some(prev) => prev.lerp(sampled, self.params.smoothing),
            None => sampled,
        };
        self.position = Some(position);

        self.pose = CameraPose { position, target };
        self.pose
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn director(speed: f32, smoothing: f32) -> CameraDirector {
        let params = CameraJourney {
            speed,
            smoothing,
            ..CameraJourney::default()
        };
        let curve = Curve::from_arrays(&params.control_points, params.closed).unwrap();
        CameraDirector::new(curve, params)
    }

    #[test]
    fn test_progress_wraps_without_feature() {
        let speed = 0.013;
        let mut camera = director(speed, 1.0);
        let ticks = 200;
        for _ in 0..ticks {
            camera.advance(0.0);
        }

        let expected = (ticks as f32 * speed).rem_euclid(1.0);
        let progress = camera.travel().progress;
        assert!((0.0..1.0).contains(&progress));
        assert!((progress - expected).abs() < 1e-4, "{} vs {}", progress, expected);
    }

    #[test]
    fn test_feature_speeds_up_travel() {
        let mut quiet = director(0.001, 1.0);
        let mut loud = director(0.001, 1.0);
        for _ in 0..10 {
            quiet.advance(0.0);
            loud.advance(255.0);
        }
        assert!(loud.travel().progress > quiet.travel().progress);
    }

    #[test]
    fn test_feature_boost_is_monotonic() {
        let camera = director(0.001, 1.0);
        let mut last = -1.0;
        for f in 0..=255 {
            let boost = camera.feature_boost(f as f32);
            assert!(boost >= last);
            last = boost;
        }
        assert_eq!(camera.feature_boost(0.0), 0.0);
    }

    #[test]
    fn test_unsmoothed_pose_samples_curve() {
        let mut camera = director(0.01, 1.0);
        let pose = camera.advance(0.0);
        let t = camera.travel().progress;
        assert_eq!(pose.position, camera.curve().point_at(t));
        assert_eq!(pose.target, camera.curve().lookahead(t, CameraJourney::default().lookahead));
    }

    #[test]
    fn test_smoothing_lags_behind_path() {
        let mut camera = director(0.05, 0.1);
        camera.advance(0.0); // first tick snaps
        let pose = camera.advance(0.0);
        let sampled = camera.curve().point_at(camera.travel().progress);
        assert!(pose.position.distance(sampled) > 1e-3);
    }

    #[test]
    fn test_idle_and_restart() {
        let mut camera = director(0.02, 1.0);
        camera.advance_idle();
        camera.advance_idle();
        assert!((camera.travel().progress - 0.04).abs() < 1e-6);

        camera.restart();
        assert_eq!(camera.travel().progress, 0.0);
    }

    #[test]
    fn test_view_proj_matrix_generation() {
        let camera = director(0.01, 1.0);
        let view_proj = camera.pose().view_proj(&RenderConfig::default());

        // Matrix should not be identity or zero
        assert_ne!(view_proj, Mat4::IDENTITY);
        assert_ne!(view_proj, Mat4::ZERO);
        assert!(view_proj.is_finite());
    }

    #[test]
    fn test_coincident_target_gives_finite_view() {
        let pose = CameraPose {
            position: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::new(0.0, 0.0, 5.0),
        };
        assert_eq!(pose.forward(), Vec3::NEG_Z);
        assert!(pose.view_proj(&RenderConfig::default()).is_finite());
    }

    #[test]
    fn test_vertical_look_gives_finite_view() {
        for dy in [1.0, -1.0] {
            let pose = CameraPose {
                position: Vec3::new(0.0, -5.0, 0.0),
                target: Vec3::new(0.0, -5.0 + dy, 0.0),
            };
            assert!(pose.view_matrix().is_finite());
            assert!(pose.view_proj(&RenderConfig::default()).is_finite());
        }
    }

    #[test]
    fn test_regular_pose_keeps_y_up() {
        let pose = CameraPose {
            position: Vec3::new(5.0, 0.0, 0.0),
            target: Vec3::ZERO,
        };
        let expected = Mat4::look_at_rh(pose.position, pose.target, Vec3::Y);
        assert!(pose.view_matrix().abs_diff_eq(expected, 1e-6));
    }
}
