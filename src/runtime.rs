// Fixed-rate control loop around the robot context
//
// Single-threaded cooperative model: each tick drains pending console
// input, runs one player tick and one control tick, none of which block.
// Player and control ticks interleave but never overlap.

use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{info, warn};

use crate::actuator::{Actuator, SimActuator};
use crate::command::{self, Command};
use crate::config::{RobotConfig, STATUS_INTERVAL_MS};
use crate::control::{Controller, DriveGeometry, Estimator, Q};
use crate::program::{LineAssembler, Player, render_full};

/// Top-level context owning every control component by value. No ambient
/// globals: ticks borrow what they need from here.
pub struct Robot<A: Actuator> {
    config: RobotConfig,
    estimator: Estimator,
    controller: Controller,
    player: Player,
    assembler: LineAssembler,
    actuator: A,
    motors_enabled: bool,
}

impl<A: Actuator> Robot<A> {
    pub fn new(config: RobotConfig, actuator: A) -> Self {
        let geometry = DriveGeometry::new(config.track_width, config.pen_offset);
        Self {
            estimator: Estimator::new(geometry),
            controller: Controller::new(geometry),
            player: Player::new(&config),
            assembler: LineAssembler::new(),
            actuator,
            motors_enabled: true,
            config,
        }
    }

    pub fn estimator(&self) -> &Estimator {
        &self.estimator
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    /// One closed-loop control tick: sample the wheels, fold into the pose,
    /// and command the controller's next wheel delta.
    pub fn control_tick(&mut self) {
        if !self.motors_enabled {
            return;
        }
        let q = self.actuator.joint_sample();
        self.estimator.update(q);

        let pose = *self.estimator.pose();
        if !self.controller.at_target(&pose, self.config.position_tolerance) {
            if let Some(dq) = self.controller.action(&pose, self.config.max_step) {
                self.actuator.apply_delta(dq);
            }
        }
    }

    /// One program-player tick.
    pub fn player_tick(&mut self, now: Instant) {
        let pose = *self.estimator.pose();
        self.player
            .update(now, &pose, &mut self.controller, &mut self.actuator);
    }

    /// Handle one console payload. A `GCODE`-prefixed payload replaces the
    /// whole program; anything else is command lines split on `\n`/`;`.
    pub fn handle_message(&mut self, input: &str) {
        if let Some(text) = input.strip_prefix("GCODE") {
            self.player.load_program(text, &mut self.controller);
            return;
        }

        for line in input.split(['\n', ';']) {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match command::parse(line) {
                Ok(cmd) => self.apply(cmd),
                Err(e) => warn!("failed to parse line `{line}`: {e}"),
            }
        }
    }

    /// Apply one parsed command to the context.
    pub fn apply(&mut self, cmd: Command) {
        match cmd {
            Command::MotorsEnabled(enabled) => {
                self.motors_enabled = enabled;
                self.actuator.set_enabled(enabled);
            }
            Command::SeekJoints(right, left) => {
                self.actuator.seek_joints(Q::new(right as f64, left as f64))
            }
            Command::Pen(down) => self.actuator.set_pen_down(down),
            Command::Reset => {
                self.estimator.reset();
                self.player.reset(&mut self.controller);
            }
            Command::MoveRelative(dx, dy) => {
                let target = self.controller.target() + Q::new(dx, dy);
                info!("relative move by ({dx:.2}, {dy:.2})");
                self.controller.set_target(target);
            }
            Command::MoveAbsolute(x, y) => {
                info!("absolute move to ({x:.2}, {y:.2})");
                self.controller.set_target(Q::new(x, y));
            }
            Command::Play => self.player.play(),
            Command::Pause => self.player.pause(),
            Command::PrintProgram => info!("program:\n{}", render_full(self.player.program())),
            Command::Status => info!(
                "{}\n{}\n{}",
                self.estimator.status(),
                self.controller.status(),
                self.player.status()
            ),
        }
    }

    // Streaming upload entry points for the transport glue. The assembler
    // absorbs arbitrary chunk fragmentation; the player stays disabled
    // until the upload ends.

    pub fn start_upload(&mut self) {
        self.player.start_upload(&mut self.controller);
    }

    pub fn upload_chunk(&mut self, chunk: &str) {
        let Self {
            assembler, player, ..
        } = self;
        assembler.push_chunk(chunk, |line| player.load_line(line));
    }

    pub fn end_upload(&mut self) {
        let Self {
            assembler,
            player,
            controller,
            ..
        } = self;
        assembler.finish(|line| player.load_line(line));
        player.end_upload(controller);
    }
}

/// Run the loop against the simulated actuator until the process is
/// stopped. Console commands arrive on stdin.
pub async fn run(config: RobotConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // The fastest commanded step should finish within a tick.
    let mut robot = Robot::new(config.clone(), SimActuator::new(2.0 * config.max_step));

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let mut tick = interval(Duration::from_millis((1000 / config.loop_hz.max(1)).max(1)));
    let started = Instant::now();
    let mut last_status = Instant::now();

    info!("runtime started: {}Hz loop", config.loop_hz);

    loop {
        tick.tick().await;

        // 1. Drain pending console input (non-blocking), oldest first
        while let Ok(line) = rx.try_recv() {
            robot.handle_message(&line);
        }

        // 2. Advance the program player, then close the control loop
        let now = Instant::now();
        robot.player_tick(now);
        robot.control_tick();

        // 3. Periodic heartbeat
        if now.duration_since(last_status) >= Duration::from_millis(STATUS_INTERVAL_MS) {
            let pen = robot.estimator().pen_position();
            info!(
                "uptime {:?}, pen at ({:.2}, {:.2})",
                started.elapsed(),
                pen.x,
                pen.y
            );
            last_status = now;
        }
    }
}
