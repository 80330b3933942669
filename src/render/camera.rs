use crate::engine::Ray;
use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CameraKind {
    #[default]
    Perspective,
    Orthographic,
}

impl CameraKind {
    pub fn label(self) -> &'static str {
        match self {
            CameraKind::Perspective => "Perspective",
            CameraKind::Orthographic => "Orthographic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    /// Pixel position to normalized device coordinates, y up.
    pub fn to_ndc(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            (point.x / self.width) * 2.0 - 1.0,
            -(point.y / self.height) * 2.0 + 1.0,
        )
    }
}

/// Values mirrored into the camera section of the side panel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraReadout {
    pub kind: CameraKind,
    pub position: [f32; 3],
    pub target: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraParams {
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
    pub ortho_half_height: f32,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            fov_deg: 75.0,
            near: 0.1,
            far: 1000.0,
            ortho_half_height: 5.0,
        }
    }
}

/// Perspective/orthographic camera pair sharing one eye and target.
#[derive(Debug, Clone, Copy)]
pub struct CameraRig {
    pub kind: CameraKind,
    pub position: Vec3,
    pub target: Vec3,
    pub params: CameraParams,
    aspect: f32,
}

impl CameraRig {
    pub fn new(params: CameraParams, viewport: Viewport) -> Self {
        Self {
            kind: CameraKind::Perspective,
            position: Vec3::new(0.0, 2.0, 5.0),
            target: Vec3::ZERO,
            params,
            aspect: viewport.aspect(),
        }
    }

    /// Switching keeps the eye and target so the view does not jump.
    pub fn set_kind(&mut self, kind: CameraKind) {
        if self.kind != kind {
            log::debug!("Camera switched to {}", kind.label());
            self.kind = kind;
        }
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.aspect = viewport.aspect();
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or(Vec3::NEG_Z)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let near = self.params.near;
        let far = self.params.far;
        match self.kind {
            CameraKind::Perspective => {
                Mat4::perspective_rh_gl(self.params.fov_deg.to_radians(), self.aspect, near, far)
            }
            CameraKind::Orthographic => {
                let half_h = self.params.ortho_half_height;
                let half_w = half_h * self.aspect;
                Mat4::orthographic_rh_gl(-half_w, half_w, -half_h, half_h, near, far)
            }
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// World-space ray through a viewport pixel.
    pub fn screen_ray(&self, point: Vec2, viewport: Viewport) -> Ray {
        let ndc = viewport.to_ndc(point);
        let inverse = self.view_projection().inverse();
        let near = inverse.project_point3(Vec3::new(ndc.x, ndc.y, -1.0));
        let far = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        Ray::new(near, (far - near).normalize_or(self.forward()))
    }

    /// Pixel position of a world point, `None` when behind the camera.
    pub fn world_to_screen(&self, point: Vec3, viewport: Viewport) -> Option<Vec2> {
        let clip = self.view_projection() * point.extend(1.0);
        if clip.w <= 1e-6 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * viewport.width,
            (1.0 - ndc.y) * 0.5 * viewport.height,
        ))
    }

    pub fn readout(&self) -> CameraReadout {
        CameraReadout {
            kind: self.kind,
            position: self.position.to_array(),
            target: self.target.to_array(),
        }
    }
}

/// Damped orbit around the rig target, driven by pointer deltas.
#[derive(Debug, Clone, Copy)]
pub struct OrbitController {
    pub enabled: bool,
    pub damping: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    yaw_velocity: f32,
    pitch_velocity: f32,
    zoom_velocity: f32,
    pan_velocity: Vec2,
}

const MIN_DISTANCE: f32 = 0.05;
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;
const REST_EPSILON: f32 = 1e-5;

impl OrbitController {
    pub fn new(damping: f32) -> Self {
        Self {
            enabled: true,
            damping: damping.clamp(0.0, 1.0),
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            pan_speed: 0.002,
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
            zoom_velocity: 0.0,
            pan_velocity: Vec2::ZERO,
        }
    }

    pub fn rotate(&mut self, delta_px: Vec2) {
        if !self.enabled {
            return;
        }
        self.yaw_velocity -= delta_px.x * self.rotate_speed;
        self.pitch_velocity += delta_px.y * self.rotate_speed;
    }

    /// Positive steps move toward the target.
    pub fn zoom(&mut self, steps: f32) {
        if !self.enabled {
            return;
        }
        self.zoom_velocity += steps * self.zoom_speed;
    }

    pub fn pan(&mut self, delta_px: Vec2) {
        if !self.enabled {
            return;
        }
        self.pan_velocity += delta_px * self.pan_speed;
    }

    /// Drops any residual motion, used when a gizmo drag starts.
    pub fn stop(&mut self) {
        self.yaw_velocity = 0.0;
        self.pitch_velocity = 0.0;
        self.zoom_velocity = 0.0;
        self.pan_velocity = Vec2::ZERO;
    }

    /// Applies one damped step. Returns whether the camera moved.
    pub fn update(&mut self, rig: &mut CameraRig) -> bool {
        let moving = self.yaw_velocity.abs() > REST_EPSILON
            || self.pitch_velocity.abs() > REST_EPSILON
            || self.zoom_velocity.abs() > REST_EPSILON
            || self.pan_velocity.length() > REST_EPSILON;
        if !moving {
            self.stop();
            return false;
        }

        let offset = rig.position - rig.target;
        let distance = offset.length().max(MIN_DISTANCE);
        let (mut yaw, mut pitch) = offset_to_yaw_pitch(offset);
        yaw += self.yaw_velocity;
        pitch = (pitch + self.pitch_velocity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        let distance = (distance * (1.0 - self.zoom_velocity)).max(MIN_DISTANCE);

        let forward = rig.forward();
        let right = forward.cross(Vec3::Y).normalize_or(Vec3::X);
        let up = right.cross(forward);
        let pan = (-right * self.pan_velocity.x + up * self.pan_velocity.y) * distance;
        rig.target += pan;
        rig.position = rig.target + yaw_pitch_to_offset(yaw, pitch) * distance;

        let keep = 1.0 - self.damping;
        self.yaw_velocity *= keep;
        self.pitch_velocity *= keep;
        self.zoom_velocity *= keep;
        self.pan_velocity *= keep;
        true
    }
}

fn offset_to_yaw_pitch(offset: Vec3) -> (f32, f32) {
    let dir = offset.normalize_or(Vec3::Z);
    let yaw = dir.x.atan2(dir.z);
    let pitch = dir.y.clamp(-1.0, 1.0).asin();
    (yaw, pitch)
}

fn yaw_pitch_to_offset(yaw: f32, pitch: f32) -> Vec3 {
    let cos_pitch = pitch.cos();
    Vec3::new(yaw.sin() * cos_pitch, pitch.sin(), yaw.cos() * cos_pitch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig() -> CameraRig {
        CameraRig::new(CameraParams::default(), Viewport::new(800.0, 600.0))
    }

    #[test]
    fn center_ray_points_at_target() {
        let rig = rig();
        let ray = rig.screen_ray(Vec2::new(400.0, 300.0), Viewport::new(800.0, 600.0));
        let expected = (rig.target - rig.position).normalize();
        assert!((ray.direction - expected).length() < 1e-3);
    }

    #[test]
    fn orthographic_switch_keeps_eye() {
        let mut rig = rig();
        let before = rig.position;
        rig.set_kind(CameraKind::Orthographic);
        assert_eq!(rig.position, before);
        let viewport = Viewport::new(800.0, 600.0);
        let ray = rig.screen_ray(Vec2::new(400.0, 300.0), viewport);
        assert!((ray.direction - rig.forward()).length() < 1e-3);
    }

    #[test]
    fn screen_rays_are_unit_length_in_both_projections() {
        let mut rig = rig();
        let viewport = Viewport::new(800.0, 600.0);
        for kind in [CameraKind::Perspective, CameraKind::Orthographic] {
            rig.set_kind(kind);
            for pixel in [Vec2::new(0.0, 0.0), Vec2::new(400.0, 300.0), Vec2::new(799.0, 12.0)] {
                let ray = rig.screen_ray(pixel, viewport);
                assert!((ray.direction.length() - 1.0).abs() < 1e-4);
            }
        }
        // a unit ray puts a point one unit further for every unit of t
        let ray = rig.screen_ray(Vec2::new(400.0, 300.0), viewport);
        assert!((ray.at(2.0).distance(ray.origin) - 2.0).abs() < 1e-4);
    }

    #[test]
    fn world_to_screen_inverts_screen_ray() {
        let rig = rig();
        let viewport = Viewport::new(800.0, 600.0);
        let pixel = Vec2::new(250.0, 420.0);
        let ray = rig.screen_ray(pixel, viewport);
        let back = rig.world_to_screen(ray.at(3.0), viewport).unwrap();
        assert!((back - pixel).length() < 0.5);
    }

    #[test]
    fn orbit_preserves_distance_and_settles() {
        let mut rig = rig();
        let mut orbit = OrbitController::new(0.05);
        let distance = rig.position.distance(rig.target);
        orbit.rotate(Vec2::new(40.0, 10.0));
        assert!(orbit.update(&mut rig));
        assert!((rig.position.distance(rig.target) - distance).abs() < 1e-3);
        for _ in 0..2000 {
            orbit.update(&mut rig);
        }
        assert!(!orbit.update(&mut rig));
        assert!(rig.position.is_finite());
    }

    #[test]
    fn disabled_orbit_ignores_input() {
        let mut rig = rig();
        let mut orbit = OrbitController::new(0.05);
        orbit.enabled = false;
        orbit.rotate(Vec2::new(40.0, 10.0));
        orbit.zoom(3.0);
        assert!(!orbit.update(&mut rig));
    }

    #[test]
    fn zoom_moves_toward_target() {
        let mut rig = rig();
        let mut orbit = OrbitController::new(0.05);
        let distance = rig.position.distance(rig.target);
        orbit.zoom(1.0);
        orbit.update(&mut rig);
        assert!(rig.position.distance(rig.target) < distance);
    }
}
