//! Camera state, auto-framing, and orbit/zoom/pan math for the viewer.

use nalgebra::{Matrix4, Point3, Vector3};

use crate::constants::{FRAME_FILL_FRACTION, LOG_TYPE_CAMERA};
use crate::scene::PcbGroup;

/// Viewer camera for board inspection.
#[derive(Clone, Debug)]
pub struct CameraState {
    pub eye: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in degrees.
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
    pub aspect: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            eye: Point3::new(0.0, 50.0, 100.0),
            target: Point3::new(0.0, 0.0, 0.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            fovy: 45.0,
            znear: 0.1,
            zfar: 10_000.0,
            aspect: 1.0,
        }
    }
}

impl CameraState {
    /// Build the view-projection matrix
    pub fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        let view = Matrix4::look_at_rh(&self.eye, &self.target, &self.up);
        let proj =
            Matrix4::new_perspective(self.aspect, self.fovy.to_radians(), self.znear, self.zfar);
        proj * view
    }

    /// Update the aspect ratio
    pub fn update_aspect(&mut self, width: f32, height: f32) {
        self.aspect = width / height;
    }

    pub fn distance(&self) -> f32 {
        (self.eye - self.target).magnitude()
    }
}

/// Reposition the camera so the assembled board fills
/// [`FRAME_FILL_FRACTION`] of the view frustum height, offset diagonally
/// above the board, with the orbit focus at the world origin.
///
/// A missing or zero-size bounding box skips framing entirely and leaves
/// the camera untouched.
pub fn frame_group(camera: &mut CameraState, group: &PcbGroup) -> bool {
    let Some((min, max)) = group.bounding_box() else {
        log::warn!(target: LOG_TYPE_CAMERA, "skipping camera framing: group has no geometry");
        return false;
    };

    // The board lies in the world X-Z plane; the larger in-plane extent
    // is the characteristic size.
    let size = (max.x - min.x).max(max.z - min.z);
    if size <= f32::EPSILON {
        log::warn!(target: LOG_TYPE_CAMERA, "skipping camera framing: degenerate bounding box");
        return false;
    }

    let half_fov = (camera.fovy / 2.0).to_radians();
    let distance = size as f64 / (2.0 * FRAME_FILL_FRACTION * half_fov.tan() as f64);

    let diagonal = (distance / f64::sqrt(3.0)) as f32;
    camera.eye = Point3::new(diagonal, diagonal, diagonal);
    camera.target = Point3::origin();
    camera.up = Vector3::y();

    log::debug!(
        target: LOG_TYPE_CAMERA,
        "framed board: size {size:.2}, camera distance {distance:.2}"
    );
    true
}

/// Orbit/zoom/pan math shared with the surrounding viewer shell. Input
/// wiring stays outside this crate; only the camera arithmetic lives here.
pub struct CameraController {
    rotation_sensitivity: f32,
    zoom_sensitivity: f32,
    pan_sensitivity: f32,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraController {
    pub fn new() -> Self {
        Self {
            rotation_sensitivity: 0.01,
            zoom_sensitivity: 0.1,
            pan_sensitivity: 0.01,
        }
    }

    /// Orbit around the target, clamping pitch to prevent flipping.
    pub fn orbit(&self, camera: &mut CameraState, delta_x: f32, delta_y: f32) {
        let radius = camera.distance();

        let mut theta = (camera.eye.z - camera.target.z).atan2(camera.eye.x - camera.target.x);
        let mut phi = ((camera.eye.y - camera.target.y) / radius).asin();

        theta -= delta_x * self.rotation_sensitivity;
        phi += delta_y * self.rotation_sensitivity;
        phi = phi.clamp(
            -std::f32::consts::FRAC_PI_2 + 0.1,
            std::f32::consts::FRAC_PI_2 - 0.1,
        );

        camera.eye = Point3::new(
            camera.target.x + radius * phi.cos() * theta.cos(),
            camera.target.y + radius * phi.sin(),
            camera.target.z + radius * phi.cos() * theta.sin(),
        );
    }

    /// Dolly toward or away from the target, clamped to a sane range.
    pub fn zoom(&self, camera: &mut CameraState, zoom_delta: f32) {
        let direction = (camera.target - camera.eye).normalize();
        camera.eye += direction * (zoom_delta * self.zoom_sensitivity);

        let distance = camera.distance();
        if distance < 0.1 {
            camera.eye = camera.target - direction * 0.1;
        } else if distance > 5000.0 {
            camera.eye = camera.target - direction * 5000.0;
        }
    }

    /// Pan eye and target together in the view plane.
    pub fn pan(&self, camera: &mut CameraState, delta_x: f32, delta_y: f32) {
        let forward = (camera.target - camera.eye).normalize();
        let right = forward.cross(&camera.up).normalize();
        let up = right.cross(&forward).normalize();

        let offset =
            right * (-delta_x * self.pan_sensitivity) + up * (delta_y * self.pan_sensitivity);
        camera.eye += offset;
        camera.target += offset;
    }
}
