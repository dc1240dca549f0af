//! Animation command sink
//!
//! States never talk to an animator directly. They queue commands here and
//! the animation collaborator drains them after the tick.

/// Animator state and parameter names
pub mod names {
    pub const GROUNDED_MOVEMENT: &str = "GroundedMovement";
    pub const STRAFE: &str = "Strafe";
    pub const JUMP: &str = "Jump";
    pub const RELOAD: &str = "Reload";
    pub const RELOAD_SPEED: &str = "ReloadSpeed";
    pub const DEATH: &str = "Death";
    pub const AIM: &str = "Aim";
    pub const SINGLE_SHOT: &str = "SingleShot";
    pub const BURST_SHOT: &str = "BurstShot";
    pub const IS_AUTO_SHOT: &str = "IsAutoShot";
    pub const SPEED: &str = "Speed";
    pub const INPUT_X: &str = "InputX";
    pub const INPUT_Y: &str = "InputY";
}

/// Upper-body layer used for aiming, shooting and reloading
pub const AIM_LAYER: u32 = 1;

/// One animator instruction
#[derive(Debug, Clone, PartialEq)]
pub enum AnimCommand {
    CrossFade { state: &'static str, duration: f32 },
    Play { state: &'static str, layer: u32 },
    SetFloat { name: &'static str, value: f32 },
    SetBool { name: &'static str, value: bool },
    SetLayerWeight { layer: u32, weight: f32 },
    /// Weight of the upper-body aim constraint
    SetAimWeight(f32),
}

/// Queue of commands produced during a tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimSink {
    commands: Vec<AnimCommand>,
}

impl AnimSink {
    /// Queue a command
    pub fn push(&mut self, command: AnimCommand) {
        self.commands.push(command);
    }

    pub fn cross_fade(&mut self, state: &'static str, duration: f32) {
        self.push(AnimCommand::CrossFade { state, duration });
    }

    pub fn play(&mut self, state: &'static str, layer: u32) {
        self.push(AnimCommand::Play { state, layer });
    }

    pub fn set_float(&mut self, name: &'static str, value: f32) {
        self.push(AnimCommand::SetFloat { name, value });
    }

    pub fn set_bool(&mut self, name: &'static str, value: bool) {
        self.push(AnimCommand::SetBool { name, value });
    }

    pub fn set_layer_weight(&mut self, layer: u32, weight: f32) {
        self.push(AnimCommand::SetLayerWeight { layer, weight });
    }

    pub fn set_aim_weight(&mut self, weight: f32) {
        self.push(AnimCommand::SetAimWeight(weight));
    }

    /// Queued commands, oldest first
    pub fn commands(&self) -> &[AnimCommand] {
        &self.commands
    }

    /// Whether a command equal to `command` is queued
    pub fn contains(&self, command: &AnimCommand) -> bool {
        self.commands.contains(command)
    }

    /// Take every queued command
    pub fn drain(&mut self) -> Vec<AnimCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
