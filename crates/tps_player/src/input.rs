//! Per-frame player intents

use tps_math::{Vec2, Vec3};

/// What the input collaborator captured this frame.
///
/// `jump`, `reload` and `change_shooting_method` are pulses; `aim` and
/// `shoot` are held states.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputFrame {
    /// Move axes (x = strafe right, y = forward)
    pub move_input: Vec2,
    pub aim: bool,
    pub shoot: bool,
    pub jump: bool,
    pub reload: bool,
    pub change_shooting_method: bool,
    /// Camera forward in world space
    pub camera_forward: Vec3,
}

impl InputFrame {
    /// Move along the axes with nothing else pressed
    pub fn moving(x: f32, y: f32) -> Self {
        Self {
            move_input: Vec2::new(x, y),
            ..Default::default()
        }
    }

    /// Set the aim button
    pub fn with_aim(mut self, aim: bool) -> Self {
        self.aim = aim;
        self
    }

    /// Set the shoot button
    pub fn with_shoot(mut self, shoot: bool) -> Self {
        self.shoot = shoot;
        self
    }

    /// Press jump this frame
    pub fn with_jump(mut self) -> Self {
        self.jump = true;
        self
    }

    /// Press reload this frame
    pub fn with_reload(mut self) -> Self {
        self.reload = true;
        self
    }

    /// Press the shooting-method switch this frame
    pub fn with_method_change(mut self) -> Self {
        self.change_shooting_method = true;
        self
    }

    /// Point the camera
    pub fn with_camera(mut self, forward: Vec3) -> Self {
        self.camera_forward = forward;
        self
    }
}

impl Default for InputFrame {
    fn default() -> Self {
        Self {
            move_input: Vec2::ZERO,
            aim: false,
            shoot: false,
            jump: false,
            reload: false,
            change_shooting_method: false,
            camera_forward: Vec3::Z,
        }
    }
}
