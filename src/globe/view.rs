use glam::DVec3;

/// Base auto-rotation speed in radians per millisecond
const BASE_SPIN: f64 = 0.00025;
/// Per-frame velocity decay back toward the auto-rotate speed
const FRICTION: f64 = 0.96;

/// Globe viewport using orthographic projection of a rotating sphere.
/// Orientation stored as a rotation frame (3 column vectors) so point
/// transforms are three dot products. The globe spins on its own and
/// carries drag inertia: a released drag decays back to the base spin.
#[derive(Clone)]
pub struct GlobeView {
    /// Direction pointing at the camera
    forward: DVec3,
    /// East on screen
    right: DVec3,
    /// North on screen
    up: DVec3,
    /// Sphere radius in braille pixels
    pub radius: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
    /// Angular velocity, radians per millisecond
    vx: f64,
    vy: f64,
    pub dragging: bool,
}

impl GlobeView {
    /// Build a globe centered on (lon, lat) filling the given pixel canvas.
    pub fn new(center_lon: f64, center_lat: f64, width: usize, height: usize) -> Self {
        let lon_rad = center_lon.to_radians();
        let lat_rad = center_lat.to_radians();

        // Forward = direction from origin to (lon, lat) on unit sphere
        let forward = DVec3::new(
            lat_rad.cos() * lon_rad.cos(),
            lat_rad.cos() * lon_rad.sin(),
            lat_rad.sin(),
        );

        // Up = derivative of forward w.r.t. latitude (points north)
        let raw_up = DVec3::new(
            -lat_rad.sin() * lon_rad.cos(),
            -lat_rad.sin() * lon_rad.sin(),
            lat_rad.cos(),
        );

        let right = forward.cross(raw_up).normalize();
        let up = right.cross(forward).normalize();

        Self {
            forward,
            right,
            up,
            radius: Self::fit_radius(width, height),
            width,
            height,
            vx: BASE_SPIN,
            vy: 0.0,
            dragging: false,
        }
    }

    fn fit_radius(width: usize, height: usize) -> f64 {
        (width.min(height * 2) as f64 / 2.2).max(4.0)
    }

    /// Resize the canvas, refitting the sphere
    pub fn set_size(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.radius = Self::fit_radius(width, height);
    }

    /// Project a geographic point to screen pixels.
    /// Returns `None` for back-face points (behind the visible hemisphere).
    pub fn project(&self, lon: f64, lat: f64) -> Option<(i32, i32)> {
        let p = lonlat_to_vec3(lon, lat);

        // Dot with forward: positive = front-facing
        if p.dot(self.forward) < 0.0 {
            return None;
        }

        let sx = p.dot(self.right);
        let sy = p.dot(self.up);

        let px = (self.width as f64 / 2.0 + sx * self.radius) as i32;
        // Braille pixels are half as wide as tall; halve the vertical scale
        let py = (self.height as f64 / 2.0 - sy * self.radius * 0.5) as i32;

        Some((px, py))
    }

    /// Unproject screen pixels back to lon/lat.
    /// Returns `None` if the point is outside the sphere disk.
    pub fn unproject(&self, px: i32, py: i32) -> Option<(f64, f64)> {
        let sx = (px as f64 - self.width as f64 / 2.0) / self.radius;
        let sy = -(py as f64 - self.height as f64 / 2.0) / (self.radius * 0.5);

        let r2 = sx * sx + sy * sy;
        if r2 > 1.0 {
            return None;
        }

        let sz = (1.0 - r2).sqrt();
        let p = self.right * sx + self.up * sy + self.forward * sz;

        let lat = p.z.clamp(-1.0, 1.0).asin().to_degrees();
        let lon = p.y.atan2(p.x).to_degrees();

        Some((lon, lat))
    }

    fn rotate_yaw(&mut self, angle: f64) {
        if angle.abs() < 1e-10 {
            return;
        }
        let (sin_a, cos_a) = angle.sin_cos();
        let new_forward = self.forward * cos_a + self.right * sin_a;
        let new_right = self.right * cos_a - self.forward * sin_a;
        self.forward = new_forward.normalize();
        self.right = new_right.normalize();
    }

    fn rotate_pitch(&mut self, angle: f64) {
        if angle.abs() < 1e-10 {
            return;
        }
        let (sin_a, cos_a) = angle.sin_cos();
        let new_forward = self.forward * cos_a + self.up * sin_a;
        let new_up = self.up * cos_a - self.forward * sin_a;
        self.forward = new_forward.normalize();
        self.up = new_up.normalize();
    }

    /// Start a drag: kill existing momentum so the surface sticks to
    /// the cursor
    pub fn begin_drag(&mut self) {
        self.dragging = true;
        self.vx = 0.0;
        self.vy = 0.0;
    }

    /// Rotate the globe by a pixel drag delta and record the velocity
    /// that "throws" it on release.
    pub fn rotate_drag(&mut self, dx: i32, dy: i32) {
        let angle_x = (dx as f64) / self.radius;
        let angle_y = -(dy as f64) / (self.radius * 0.5);
        self.rotate_yaw(angle_x);
        self.rotate_pitch(angle_y);
        // Assume ~16 ms since the previous drag event
        self.vx = angle_x / 16.0;
        self.vy = angle_y / 16.0;
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Per-frame update: apply momentum, then decay velocity back to the
    /// base auto-rotate spin. No-op while a drag is in progress.
    pub fn advance(&mut self, dt_ms: f64) {
        if self.dragging {
            return;
        }
        self.rotate_yaw(self.vx * dt_ms);
        self.rotate_pitch(self.vy * dt_ms);
        self.vx = self.vx * FRICTION + BASE_SPIN * (1.0 - FRICTION);
        self.vy *= FRICTION;
    }

    /// Center longitude/latitude the globe is looking at
    pub fn center_lonlat(&self) -> (f64, f64) {
        let lat = self.forward.z.asin().to_degrees();
        let lon = self.forward.y.atan2(self.forward.x).to_degrees();
        (lon, lat)
    }
}

/// Convert lon/lat (degrees) to a unit sphere vector.
#[inline(always)]
fn lonlat_to_vec3(lon: f64, lat: f64) -> DVec3 {
    let lon_rad = lon.to_radians();
    let lat_rad = lat.to_radians();
    DVec3::new(
        lat_rad.cos() * lon_rad.cos(),
        lat_rad.cos() * lon_rad.sin(),
        lat_rad.sin(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_projects_to_middle() {
        let view = GlobeView::new(0.0, 0.0, 100, 100);
        let (px, py) = view.project(0.0, 0.0).unwrap();
        assert_eq!(px, 50);
        assert_eq!(py, 50);
    }

    #[test]
    fn test_backface_culled() {
        let view = GlobeView::new(0.0, 0.0, 100, 100);
        assert!(view.project(180.0, 0.0).is_none());
    }

    #[test]
    fn test_unproject_roundtrip() {
        let view = GlobeView::new(10.0, 20.0, 200, 120);
        let (px, py) = view.project(15.0, 25.0).unwrap();
        let (lon, lat) = view.unproject(px, py).unwrap();
        assert!((lon - 15.0).abs() < 2.0, "lon {lon}");
        assert!((lat - 25.0).abs() < 2.0, "lat {lat}");
    }

    #[test]
    fn test_unproject_outside_disk() {
        let view = GlobeView::new(0.0, 0.0, 100, 100);
        assert!(view.unproject(-1000, 50).is_none());
    }

    #[test]
    fn test_auto_rotation_moves_center() {
        let mut view = GlobeView::new(0.0, 0.0, 100, 100);
        let (lon_before, _) = view.center_lonlat();
        for _ in 0..10 {
            view.advance(16.0);
        }
        let (lon_after, _) = view.center_lonlat();
        assert!((lon_after - lon_before).abs() > 1e-6);
    }

    #[test]
    fn test_drag_halts_auto_spin() {
        let mut view = GlobeView::new(0.0, 0.0, 100, 100);
        view.begin_drag();
        let (lon_before, _) = view.center_lonlat();
        view.advance(16.0);
        let (lon_after, _) = view.center_lonlat();
        assert_eq!(lon_before.to_bits(), lon_after.to_bits());
    }

    #[test]
    fn test_momentum_decays_toward_base_spin() {
        let mut view = GlobeView::new(0.0, 0.0, 100, 100);
        view.begin_drag();
        view.rotate_drag(40, 0);
        view.end_drag();
        for _ in 0..600 {
            view.advance(16.0);
        }
        assert!((view.vx - BASE_SPIN).abs() < BASE_SPIN * 0.1);
        assert!(view.vy.abs() < 1e-6);
    }
}
