//! Navigation service
//!
//! Enemies never move themselves. They hand a destination to a
//! [`Navigation`] agent and read back its velocity, the way a nav-mesh agent
//! is driven. [`DirectNavigation`] walks a straight line and is what the
//! headless runtime and the tests use.

use tps_math::Vec3;

/// Path-following agent owned by one enemy
pub trait Navigation: Send {
    /// Head for `destination` (replaces any previous one)
    fn set_destination(&mut self, destination: Vec3);

    /// Velocity produced by the last step
    fn velocity(&self) -> Vec3;

    /// Halt in place, keeping the destination
    fn stop(&mut self);

    /// Continue toward the destination
    fn resume(&mut self);

    /// Whether the agent is halted
    fn is_stopped(&self) -> bool;

    /// Teleport without pathing (spawns, knockback displacement)
    fn warp(&mut self, position: Vec3);

    /// Current position
    fn position(&self) -> Vec3;

    /// Advance one tick and return the new position
    fn advance(&mut self, dt: f32) -> Vec3;

    /// Forget the destination and return to the origin, moving
    fn reset(&mut self) {
        self.warp(Vec3::ZERO);
        self.resume();
    }
}

/// Straight-line agent on a flat floor
#[derive(Debug, Clone, PartialEq)]
pub struct DirectNavigation {
    position: Vec3,
    destination: Option<Vec3>,
    velocity: Vec3,
    /// Movement speed in units per second
    pub speed: f32,
    /// Stop this close to the destination
    pub stopping_distance: f32,
    stopped: bool,
}

impl DirectNavigation {
    /// Create an agent at the origin
    pub fn new(speed: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            destination: None,
            velocity: Vec3::ZERO,
            speed: speed.max(0.0),
            stopping_distance: 0.5,
            stopped: false,
        }
    }

    /// Set the stopping distance
    pub fn with_stopping_distance(mut self, distance: f32) -> Self {
        self.stopping_distance = distance.max(0.0);
        self
    }

    /// Current destination
    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }
}

impl Default for DirectNavigation {
    fn default() -> Self {
        Self::new(3.5)
    }
}

impl Navigation for DirectNavigation {
    fn set_destination(&mut self, destination: Vec3) {
        self.destination = Some(destination);
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn stop(&mut self) {
        self.stopped = true;
        self.velocity = Vec3::ZERO;
    }

    fn resume(&mut self) {
        self.stopped = false;
    }

    fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn warp(&mut self, position: Vec3) {
        self.position = position;
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn advance(&mut self, dt: f32) -> Vec3 {
        let destination = match self.destination {
            Some(destination) if !self.stopped && dt > 0.0 => destination,
            _ => {
                self.velocity = Vec3::ZERO;
                return self.position;
            }
        };

        let offset = (destination - self.position).with_y(0.0);
        let distance = offset.length();
        if distance <= self.stopping_distance {
            self.velocity = Vec3::ZERO;
            return self.position;
        }

        let step = (self.speed * dt).min(distance - self.stopping_distance);
        let direction = offset / distance;
        self.velocity = direction * (step / dt);
        self.position += direction * step;
        self.position
    }

    fn reset(&mut self) {
        self.position = Vec3::ZERO;
        self.destination = None;
        self.velocity = Vec3::ZERO;
        self.stopped = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_walks_straight_at_speed() {
        let mut nav = DirectNavigation::new(2.0);
        nav.set_destination(Vec3::new(0.0, 0.0, 10.0));
        let position = nav.advance(0.5);
        assert_abs_diff_eq!(position.z, 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(nav.velocity().z, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_halts_at_stopping_distance() {
        let mut nav = DirectNavigation::new(10.0).with_stopping_distance(1.0);
        nav.set_destination(Vec3::new(3.0, 0.0, 0.0));
        nav.advance(1.0);
        assert_abs_diff_eq!(nav.position().x, 2.0, epsilon = 1e-5);
        nav.advance(1.0);
        assert_eq!(nav.velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_stopped_agent_stays_put() {
        let mut nav = DirectNavigation::new(2.0);
        nav.set_destination(Vec3::new(5.0, 0.0, 0.0));
        nav.stop();
        assert_eq!(nav.advance(1.0), Vec3::ZERO);
        assert!(nav.is_stopped());

        nav.resume();
        assert!(nav.advance(1.0).x > 0.0);
    }

    #[test]
    fn test_reset_drops_destination_and_position() {
        let mut nav = DirectNavigation::new(2.0);
        nav.set_destination(Vec3::new(5.0, 0.0, 0.0));
        nav.advance(1.0);
        nav.stop();

        nav.reset();
        assert_eq!(nav, DirectNavigation::new(2.0));
        assert_eq!(nav.advance(1.0), Vec3::ZERO);
    }

    #[test]
    fn test_ignores_height_difference() {
        let mut nav = DirectNavigation::new(1.0);
        nav.warp(Vec3::new(0.0, 0.0, 0.0));
        nav.set_destination(Vec3::new(0.0, 5.0, 0.0));
        nav.advance(1.0);
        assert_eq!(nav.velocity(), Vec3::ZERO);
    }
}
