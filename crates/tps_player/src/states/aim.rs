use tps_combat::ShootingMethod;
use tps_fsm::State;
use tps_math::Vec2;

use crate::anim::{names, AIM_LAYER};
use crate::context::{smooth_input, PlayerContext, PlayerStateKey, RootBaseline, SpeedRamp};

/// Strafing with the upper body on the aim layer. Handles shooting.
pub struct AimState {
    ramp: SpeedRamp,
    baseline: RootBaseline,
    smoothed: Vec2,
}

impl AimState {
    pub fn new(ramp: f32) -> Self {
        Self {
            ramp: SpeedRamp::new(ramp),
            baseline: RootBaseline::new(tps_math::Vec3::Z),
            smoothed: Vec2::ZERO,
        }
    }

    /// Whether the root is catching up with the camera
    pub fn is_turning(&self) -> bool {
        self.baseline.is_turning()
    }

    fn dispatch_shooting(ctx: &mut PlayerContext) {
        let method = ctx.shooting_method;
        if method != ShootingMethod::Auto && ctx.auto_shot {
            ctx.auto_shot = false;
            ctx.anim.set_bool(names::IS_AUTO_SHOT, false);
        }

        match method {
            ShootingMethod::Auto => {
                if ctx.auto_shot != ctx.shooting {
                    ctx.auto_shot = ctx.shooting;
                    ctx.anim.set_bool(names::IS_AUTO_SHOT, ctx.shooting);
                }
            }
            ShootingMethod::Single | ShootingMethod::Burst => {
                if !ctx.shooting {
                    return;
                }
                // Presses are consumed whether or not the cooldown allows them
                ctx.shooting = false;
                let slot = method.index();
                if ctx.elapsed - ctx.last_shot[slot] < ctx.config.cooldown(method) {
                    return;
                }
                let animation = if method == ShootingMethod::Single {
                    names::SINGLE_SHOT
                } else {
                    names::BURST_SHOT
                };
                ctx.anim.play(animation, AIM_LAYER);
                ctx.last_shot[slot] = ctx.elapsed;
                ctx.shots_armed = ctx.config.rounds_per_press(method);
            }
        }
    }
}

impl State<PlayerStateKey, PlayerContext> for AimState {
    fn key(&self) -> PlayerStateKey {
        PlayerStateKey::Aim
    }

    fn transitions(&self) -> Vec<PlayerStateKey> {
        vec![PlayerStateKey::Reload, PlayerStateKey::Run, PlayerStateKey::Idle]
    }

    fn enter(&mut self, ctx: &mut PlayerContext) {
        self.ramp.restart();
        self.baseline.reset(ctx.facing);
        ctx.anim.cross_fade(names::STRAFE, ctx.config.crossfade);
    }

    fn update(&mut self, ctx: &mut PlayerContext, dt: f32) {
        let ramping = !self.ramp.is_done();
        ctx.current_speed = self.ramp.step(ctx.current_speed, ctx.target_speed, dt);
        if ramping {
            ctx.anim.set_layer_weight(AIM_LAYER, self.ramp.progress());
        }

        self.smoothed = smooth_input(self.smoothed, ctx.move_input, dt, ctx.config.input_smoothing);
        ctx.anim.set_float(names::SPEED, ctx.current_speed);
        ctx.anim.set_float(names::INPUT_X, self.smoothed.x);
        ctx.anim.set_float(names::INPUT_Y, self.smoothed.y);

        ctx.update_horizontal_velocity(ctx.current_speed);
        Self::dispatch_shooting(ctx);
        self.baseline.update(ctx, dt);

        let weight = if self.baseline.is_turning() {
            ctx.config.aim_turning_weight
        } else {
            self.ramp.progress()
        };
        if weight != ctx.aim_weight {
            ctx.aim_weight = weight;
            ctx.anim.set_aim_weight(weight);
        }
    }

    fn exit(&mut self, ctx: &mut PlayerContext) {
        ctx.anim.set_layer_weight(AIM_LAYER, 0.0);
        ctx.anim.play(names::AIM, AIM_LAYER);
        if ctx.auto_shot {
            ctx.anim.set_bool(names::IS_AUTO_SHOT, false);
        }
        ctx.auto_shot = false;
        ctx.shooting = false;
        ctx.shots_armed = 0;
        ctx.aim_weight = 0.0;
        ctx.anim.set_aim_weight(0.0);
    }

    fn next_state(&self, ctx: &PlayerContext) -> PlayerStateKey {
        if ctx.reloading {
            PlayerStateKey::Reload
        } else if !ctx.aiming {
            ctx.locomotion_state()
        } else {
            PlayerStateKey::Aim
        }
    }
}
