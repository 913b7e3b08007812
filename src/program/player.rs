// Program playback state machine
//
// Walks the instruction sequence one tick at a time. All waiting is
// non-blocking: dwells and move completion are re-polled every tick against
// an injected monotonic `now`, so the tick never stalls the loop that also
// services the transport.

use std::time::{Duration, Instant};

use nalgebra::Vector2;
use tracing::{info, warn};

use crate::actuator::Actuator;
use crate::config::RobotConfig;
use crate::control::{Controller, Pose};

use super::instruction::{Instruction, Program};
use super::parser::GcodeParser;

/// Sub-states of a rapid move. The pen is lifted for travel and restored to
/// its prior state afterwards; each phase consumes at least one tick, so
/// pen transitions always complete before travel resumes.
#[derive(Clone, Copy, Debug, PartialEq)]
enum RapidPhase {
    Lift,
    LiftSettle,
    Command,
    Travel,
    Restore,
    RestoreSettle,
}

pub struct Player {
    program: Program,
    parser: GcodeParser,
    cursor: usize,
    paused: bool,
    uploading: bool,
    pen_down: bool,
    rapid: RapidPhase,
    dwell_start: Option<Instant>,
    settle: Duration,
    tolerance: f64,
}

impl Player {
    pub fn new(config: &RobotConfig) -> Self {
        Self {
            program: Program::new(),
            parser: GcodeParser::new(),
            cursor: 0,
            paused: true,
            uploading: false,
            pen_down: false,
            rapid: RapidPhase::Lift,
            dwell_start: None,
            settle: Duration::from_millis(config.pen_settle_ms),
            tolerance: config.position_tolerance,
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.program.len()
    }

    pub fn play(&mut self) {
        self.paused = false;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Rewind to instruction 0, pause, and return the controller target to
    /// the canonical start. The estimator is deliberately untouched.
    pub fn reset(&mut self, controller: &mut Controller) {
        self.cursor = 0;
        self.paused = true;
        self.rapid = RapidPhase::Lift;
        self.dwell_start = None;
        controller.reset();
    }

    /// Replace the whole program from `text`. Returns the number of input
    /// bytes that did not fit.
    pub fn load_program(&mut self, text: &str, controller: &mut Controller) -> usize {
        self.program.clear();
        self.parser = GcodeParser::new();
        let consumed = self.parser.parse_into(text, &mut self.program);
        info!("parsed {} program instructions", self.program.len());

        let dropped = text.len() - consumed;
        if dropped > 0 {
            warn!("program storage full, {dropped} bytes of input dropped");
        }
        self.program.seal();
        self.reset(controller);
        dropped
    }

    /// Append one line to the program (streamed upload path).
    pub fn load_line(&mut self, line: &str) {
        let consumed = self.parser.parse_into(line, &mut self.program);
        if consumed < line.len() {
            warn!(
                "program storage full, {} bytes of input dropped",
                line.len() - consumed
            );
        }
    }

    /// Begin a streaming upload: clear the program and stop all ticking
    /// until `end_upload`, so the bounded storage can be rebuilt safely.
    pub fn start_upload(&mut self, controller: &mut Controller) {
        self.uploading = true;
        self.program.clear();
        self.parser = GcodeParser::new();
        info!("upload starting");
        self.reset(controller);
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn end_upload(&mut self, controller: &mut Controller) {
        self.uploading = false;
        self.program.seal();
        info!("upload finished, resetting program player");
        self.reset(controller);
    }

    /// One player tick. Dispatches on the active instruction; a cursor past
    /// the program end is a safe no-op.
    pub fn update<A: Actuator>(
        &mut self,
        now: Instant,
        pose: &Pose,
        controller: &mut Controller,
        actuator: &mut A,
    ) {
        if self.paused || self.uploading {
            return;
        }
        let Some(&instruction) = self.program.get(self.cursor) else {
            return;
        };

        match instruction {
            Instruction::Linear(target) => {
                controller.set_target(target);
                if controller.at_target(pose, self.tolerance) {
                    self.cursor += 1;
                }
            }
            Instruction::Home => {
                controller.set_target(Vector2::zeros());
                if controller.at_target(pose, self.tolerance) {
                    self.cursor += 1;
                }
            }
            Instruction::PenDown => {
                actuator.set_pen_down(true);
                self.pen_down = true;
                if self.dwell(now, self.settle) {
                    self.cursor += 1;
                }
            }
            Instruction::PenUp => {
                actuator.set_pen_down(false);
                self.pen_down = false;
                if self.dwell(now, self.settle) {
                    self.cursor += 1;
                }
            }
            Instruction::Dwell(ms) => {
                if self.dwell(now, Duration::from_secs_f64(ms / 1000.0)) {
                    self.cursor += 1;
                }
            }
            Instruction::Rapid(target) => self.rapid_tick(now, target, pose, controller, actuator),
            Instruction::End => {
                self.cursor += 1;
                self.paused = true;
            }
        }
    }

    /// One phase transition per tick, at most. `pen_down` is the logical
    /// pen state set by PenUp/PenDown instructions; the temporary lift here
    /// does not change it, which is exactly what lets Restore consult it.
    fn rapid_tick<A: Actuator>(
        &mut self,
        now: Instant,
        target: Vector2<f64>,
        pose: &Pose,
        controller: &mut Controller,
        actuator: &mut A,
    ) {
        match self.rapid {
            RapidPhase::Lift => {
                if self.pen_down {
                    actuator.set_pen_down(false);
                }
                self.rapid = RapidPhase::LiftSettle;
            }
            RapidPhase::LiftSettle => {
                if !self.pen_down || self.dwell(now, self.settle) {
                    self.rapid = RapidPhase::Command;
                }
            }
            RapidPhase::Command => {
                controller.set_target(target);
                self.rapid = RapidPhase::Travel;
            }
            RapidPhase::Travel => {
                if controller.at_target(pose, self.tolerance) {
                    self.rapid = RapidPhase::Restore;
                }
            }
            RapidPhase::Restore => {
                if self.pen_down {
                    actuator.set_pen_down(true);
                }
                self.rapid = RapidPhase::RestoreSettle;
            }
            RapidPhase::RestoreSettle => {
                if !self.pen_down || self.dwell(now, self.settle) {
                    self.cursor += 1;
                    self.rapid = RapidPhase::Lift;
                }
            }
        }
    }

    /// Shared dwell routine. `None` is the "unset" sentinel: the first tick
    /// that needs the dwell stamps its origin, completion clears it for the
    /// next user.
    fn dwell(&mut self, now: Instant, duration: Duration) -> bool {
        let start = *self.dwell_start.get_or_insert(now);
        if now.duration_since(start) >= duration {
            self.dwell_start = None;
            true
        } else {
            false
        }
    }

    pub fn status(&self) -> String {
        let current = self
            .program
            .render_line(self.cursor)
            .unwrap_or_else(|| "(none)\n".to_string());
        format!(
            "player: {} instructions, index {}, paused {}, uploading {}, pen_down {}, current {}",
            self.program.len(),
            self.cursor,
            self.paused,
            self.uploading,
            self.pen_down,
            current.trim_end()
        )
    }
}
