//! Physics and visibility queries
//!
//! The session never owns level geometry. Ground probes, static raycasts,
//! nav-mesh sampling and camera line-of-sight go through [`WorldServices`];
//! [`FlatWorld`] is an infinite floor with optional spherical occluders.

use tps_math::{consts::DEG_TO_RAD, Vec3};

/// Camera pose used for visibility checks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub position: Vec3,
    /// Unit forward vector
    pub forward: Vec3,
    /// Horizontal field of view in degrees
    pub fov_degrees: f32,
}

impl CameraView {
    pub fn new(position: Vec3, forward: Vec3) -> Self {
        Self {
            position,
            forward: forward.normalize_or_zero(),
            fov_degrees: 60.0,
        }
    }

    /// Whether `point` lies in the half-space in front of the camera
    pub fn is_in_front(&self, point: Vec3) -> bool {
        self.forward.dot((point - self.position).normalize_or_zero()) > 0.0
    }

    /// Whether `point` falls inside the view cone
    pub fn in_view(&self, point: Vec3) -> bool {
        let to_point = (point - self.position).normalize_or_zero();
        let half = self.fov_degrees * 0.5 * DEG_TO_RAD;
        self.forward.dot(to_point) > half.cos()
    }
}

/// Level queries provided by the physics and navigation collaborators
pub trait WorldServices: Send {
    /// Height of the ground straight below `point`, if any
    fn ground_below(&self, point: Vec3) -> Option<f32>;

    /// First static-geometry hit along a ray
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Vec3>;

    /// Nearest walkable point within `max_distance`
    fn sample_navigation(&self, point: Vec3, max_distance: f32) -> Option<Vec3>;

    /// Whether the camera has an unobstructed view of `point` inside its frustum
    fn is_visible(&self, camera: &CameraView, point: Vec3) -> bool {
        if !camera.in_view(point) {
            return false;
        }
        !self.is_blocked(camera, point)
    }

    /// Whether something sits between the camera and `point`
    fn is_blocked(&self, camera: &CameraView, point: Vec3) -> bool {
        let offset = point - camera.position;
        let distance = offset.length();
        match self.raycast(camera.position, offset, distance) {
            Some(hit) => hit.distance(point) > 0.5,
            None => false,
        }
    }
}

/// Sphere standing on the floor that blocks line of sight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Occluder {
    pub center: Vec3,
    pub radius: f32,
}

/// Infinite flat floor at `floor_height` bounded by a square walkable area
#[derive(Debug, Clone, PartialEq)]
pub struct FlatWorld {
    pub floor_height: f32,
    /// Half the side of the walkable square around the origin
    pub half_extent: f32,
    pub occluders: Vec<Occluder>,
}

impl FlatWorld {
    pub fn new(half_extent: f32) -> Self {
        Self {
            floor_height: 0.0,
            half_extent,
            occluders: Vec::new(),
        }
    }

    pub fn with_occluder(mut self, center: Vec3, radius: f32) -> Self {
        self.occluders.push(Occluder { center, radius });
        self
    }

    fn inside(&self, point: Vec3) -> bool {
        point.x.abs() <= self.half_extent && point.z.abs() <= self.half_extent
    }

    fn hit_floor(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        if direction.y >= 0.0 || origin.y < self.floor_height {
            return None;
        }
        Some((self.floor_height - origin.y) / direction.y)
    }

    fn hit_occluder(origin: Vec3, direction: Vec3, occluder: &Occluder) -> Option<f32> {
        let to_center = occluder.center - origin;
        let along = to_center.dot(direction);
        let closest_sq = to_center.length_squared() - along * along;
        let radius_sq = occluder.radius * occluder.radius;
        if closest_sq > radius_sq {
            return None;
        }
        let depth = (radius_sq - closest_sq).sqrt();
        let near = along - depth;
        if near >= 0.0 {
            Some(near)
        } else if along + depth >= 0.0 {
            Some(0.0)
        } else {
            None
        }
    }
}

impl Default for FlatWorld {
    fn default() -> Self {
        Self::new(50.0)
    }
}

impl WorldServices for FlatWorld {
    fn ground_below(&self, point: Vec3) -> Option<f32> {
        (self.inside(point) && point.y >= self.floor_height).then_some(self.floor_height)
    }

    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Vec3> {
        let direction = direction.normalize_or_zero();
        if direction.is_zero() {
            return None;
        }
        let floor = self.hit_floor(origin, direction);
        let occluder = self
            .occluders
            .iter()
            .filter_map(|o| Self::hit_occluder(origin, direction, o))
            .min_by(|a, b| a.total_cmp(b));

        let distance = match (floor, occluder) {
            (Some(a), Some(b)) => a.min(b),
            (a, b) => a.or(b)?,
        };
        (distance <= max_distance).then(|| origin + direction * distance)
    }

    fn sample_navigation(&self, point: Vec3, max_distance: f32) -> Option<Vec3> {
        if !self.inside(point) {
            return None;
        }
        let on_floor = point.with_y(self.floor_height);
        if point.distance(on_floor) > max_distance {
            return None;
        }
        let blocked = self
            .occluders
            .iter()
            .any(|o| on_floor.with_y(0.0).distance(o.center.with_y(0.0)) < o.radius);
        (!blocked).then_some(on_floor)
    }
}
