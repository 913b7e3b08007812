// Actuator contract and a simulated drive for tests and bench runs
//
// The real driver (step/PWM generation, servo pulses) lives outside the
// core. The core hands it clamped wheel deltas and pen up/down commands,
// and reads back cumulative wheel positions. Everything here is in length
// units; encoder-step conversion is the driver's business.

use tracing::debug;

use crate::control::Q;

pub trait Actuator {
    /// Current cumulative wheel positions (right, left).
    fn joint_sample(&mut self) -> Q;

    /// Command a relative wheel move, accumulated onto the current goal.
    fn apply_delta(&mut self, dq: Q);

    /// Command absolute wheel position targets, bypassing the controller.
    fn seek_joints(&mut self, target: Q);

    fn set_pen_down(&mut self, down: bool);

    /// Motor enable. Disabled motors hold position and ignore commands.
    fn set_enabled(&mut self, enabled: bool);
}

/// Ideal kinematic plant: wheels track their goal at a bounded per-tick
/// speed, each wheel's cap scaled to its share of the move so both arrive
/// together.
pub struct SimActuator {
    position: Q,
    goal: Q,
    speed: Q,
    base_speed: f64,
    pen_down: bool,
    enabled: bool,
}

impl SimActuator {
    /// `base_speed` is the fastest wheel's travel per tick.
    pub fn new(base_speed: f64) -> Self {
        Self {
            position: Q::zeros(),
            goal: Q::zeros(),
            speed: Q::new(base_speed, base_speed),
            base_speed,
            pen_down: false,
            enabled: true,
        }
    }

    pub fn pen_down(&self) -> bool {
        self.pen_down
    }

    /// Advance the plant one tick toward its goal.
    fn step(&mut self) {
        if !self.enabled {
            return;
        }
        for i in 0..2 {
            let remaining = self.goal[i] - self.position[i];
            self.position[i] += remaining.clamp(-self.speed[i], self.speed[i]);
        }
    }
}

impl Actuator for SimActuator {
    fn joint_sample(&mut self) -> Q {
        self.step();
        self.position
    }

    fn apply_delta(&mut self, dq: Q) {
        if !self.enabled {
            return;
        }
        self.goal += dq;

        // Scale per-wheel speed to the move so both wheels finish together.
        let (right, left) = (dq.x.abs(), dq.y.abs());
        let largest = right.max(left);
        if largest > 0.0 {
            self.speed = Q::new(
                self.base_speed * right / largest,
                self.base_speed * left / largest,
            );
        }
    }

    fn seek_joints(&mut self, target: Q) {
        if !self.enabled {
            return;
        }
        self.goal = target;
        self.speed = Q::new(self.base_speed, self.base_speed);
    }

    fn set_pen_down(&mut self, down: bool) {
        debug!("pen {}", if down { "down" } else { "up" });
        self.pen_down = down;
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_goal_at_bounded_speed() {
        let mut sim = SimActuator::new(2.0);
        sim.apply_delta(Q::new(5.0, 5.0));
        assert_eq!(sim.joint_sample(), Q::new(2.0, 2.0));
        assert_eq!(sim.joint_sample(), Q::new(4.0, 4.0));
        assert_eq!(sim.joint_sample(), Q::new(5.0, 5.0));
    }

    #[test]
    fn unequal_deltas_finish_together() {
        let mut sim = SimActuator::new(4.0);
        sim.apply_delta(Q::new(4.0, 2.0));
        // Left runs at half speed so both arrive on the same tick.
        assert_eq!(sim.joint_sample(), Q::new(4.0, 2.0));
    }

    #[test]
    fn disabled_motors_ignore_commands() {
        let mut sim = SimActuator::new(2.0);
        sim.set_enabled(false);
        sim.apply_delta(Q::new(5.0, 5.0));
        assert_eq!(sim.joint_sample(), Q::zeros());
        sim.set_enabled(true);
        assert_eq!(sim.joint_sample(), Q::zeros());
    }
}
