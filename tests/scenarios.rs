// End-to-end scenarios across the parse -> play -> control pipeline

use std::time::{Duration, Instant};

use nalgebra::Vector2;

use scribble_runtime::actuator::{Actuator, SimActuator};
use scribble_runtime::config::RobotConfig;
use scribble_runtime::control::{Controller, DriveGeometry, Estimator, Q};
use scribble_runtime::program::{Instruction, Player, Program, render_full};
use scribble_runtime::runtime::Robot;

fn robot() -> Robot<SimActuator> {
    let config = RobotConfig::default();
    let speed = 2.0 * config.max_step;
    Robot::new(config, SimActuator::new(speed))
}

#[test]
fn streamed_chunks_match_a_single_shot_load() {
    let mut text = String::new();
    for i in 0..20 {
        text.push_str(&format!("G1 X{i} Y{}\n", i * 2));
    }
    text.push_str("G91\nG0 X5\nM3\nG4 P100\nM5\nG28\nM2\n");

    let mut whole = robot();
    whole.handle_message(&format!("GCODE{text}"));
    let expected = render_full(whole.player().program());

    // Re-deliver the same program in pathological fragment sizes.
    for chunk_size in [1usize, 3, 7, 64] {
        let mut streamed = robot();
        streamed.start_upload();
        let bytes = text.as_bytes();
        for chunk in bytes.chunks(chunk_size) {
            streamed.upload_chunk(std::str::from_utf8(chunk).unwrap());
        }
        streamed.end_upload();

        assert_eq!(
            render_full(streamed.player().program()),
            expected,
            "chunk size {chunk_size}"
        );
    }
}

/// Emit the canonical G-code for a program, for re-parsing.
fn to_gcode(program: &Program) -> String {
    let mut out = String::new();
    for i in 0..program.len() {
        match *program.get(i).unwrap() {
            Instruction::Rapid(t) => out.push_str(&format!("G0 X{:.2} Y{:.2}\n", t.x, t.y)),
            Instruction::Linear(t) => out.push_str(&format!("G1 X{:.2} Y{:.2}\n", t.x, t.y)),
            Instruction::PenUp => out.push_str("M5\n"),
            Instruction::PenDown => out.push_str("M3\n"),
            Instruction::Dwell(ms) => out.push_str(&format!("G4 P{ms:.2}\n")),
            Instruction::Home => out.push_str("G28\n"),
            Instruction::End => out.push_str("M2\n"),
        }
    }
    out
}

#[test]
fn gcode_emission_round_trips_to_the_same_program() {
    let mut first = robot();
    first.handle_message("GCODEG0 X10.5 Y-3\nM3\nG1 X0.125 Y7\nG4 P500\nM5\nG28\nM2\n");

    let mut second = robot();
    second.handle_message(&format!("GCODE{}", to_gcode(first.player().program())));

    // Kinds and targets survive to the printed precision, byte-for-byte in
    // the listing.
    assert_eq!(
        render_full(first.player().program()),
        render_full(second.player().program())
    );
}

#[test]
fn capacity_boundary_fills_and_overflows() {
    let config = RobotConfig::default();
    let geometry = DriveGeometry::new(config.track_width, config.pen_offset);
    let mut controller = Controller::new(geometry);

    // Capacity - 1 instructions leave exactly one slot for the sealed End.
    let mut text = String::new();
    for i in 0..Program::CAPACITY - 1 {
        text.push_str(&format!("G1 X{i}\n"));
    }
    let mut player = Player::new(&config);
    let dropped = player.load_program(&text, &mut controller);
    assert_eq!(dropped, 0);
    assert_eq!(player.program().len(), Program::CAPACITY);
    assert_eq!(
        player.program().get(Program::CAPACITY - 1),
        Some(&Instruction::End)
    );

    // One instruction past capacity is dropped and reported.
    text.push_str(&format!("G1 X{}\nG1 X{}\n", Program::CAPACITY - 1, Program::CAPACITY));
    let dropped = player.load_program(&text, &mut controller);
    assert!(dropped > 0);
    assert_eq!(player.program().len(), Program::CAPACITY);
}

/// Ideal plant that records pen transitions with the joint positions at
/// which they happened.
struct RecordingActuator {
    position: Q,
    pen_down: bool,
    events: Vec<(bool, Q)>,
}

impl RecordingActuator {
    fn new() -> Self {
        Self {
            position: Q::zeros(),
            pen_down: false,
            events: Vec::new(),
        }
    }
}

impl Actuator for RecordingActuator {
    fn joint_sample(&mut self) -> Q {
        self.position
    }

    fn apply_delta(&mut self, dq: Q) {
        self.position += dq;
    }

    fn seek_joints(&mut self, target: Q) {
        self.position = target;
    }

    fn set_pen_down(&mut self, down: bool) {
        if down != self.pen_down {
            self.pen_down = down;
            self.events.push((down, self.position));
        }
    }

    fn set_enabled(&mut self, _enabled: bool) {}
}

#[test]
fn rapid_sequences_pen_lift_travel_and_restore() {
    let config = RobotConfig::default();
    let geometry = DriveGeometry::new(config.track_width, config.pen_offset);
    let mut estimator = Estimator::new(geometry);
    let mut controller = Controller::new(geometry);
    let mut player = Player::new(&config);
    let mut plant = RecordingActuator::new();

    player.load_program("M3\nG0 X10 Y0\n", &mut controller);
    player.play();

    let mut now = Instant::now();
    let period = Duration::from_millis(1000 / config.loop_hz);
    for _ in 0..500 {
        now += period;
        let pose = *estimator.pose();
        player.update(now, &pose, &mut controller, &mut plant);

        let q = plant.joint_sample();
        estimator.update(q);
        let pose = *estimator.pose();
        if !controller.at_target(&pose, config.position_tolerance) {
            if let Some(dq) = controller.action(&pose, config.max_step) {
                plant.apply_delta(dq);
            }
        }
    }

    // Program [PenDown, Rapid, End] ran to completion and re-paused.
    assert!(player.is_finished());
    assert!(player.is_paused());
    assert!((estimator.pen_position() - Vector2::new(10.0, 0.0)).norm() < config.position_tolerance);

    // Pen history: down (instruction), up (lift), down (restore).
    assert_eq!(plant.events.len(), 3);
    let (down0, at0) = plant.events[0];
    let (down1, at1) = plant.events[1];
    let (down2, at2) = plant.events[2];
    assert!(down0 && !down1 && down2);

    // The lift happened before any travel, the restore after all of it.
    assert!(at0.norm() < 1e-9);
    assert!(at1.norm() < 1e-9);
    assert!((at2 - at1).norm() > 5.0);
}

#[test]
fn relative_moves_from_origin_accumulate() {
    let mut robot = robot();
    robot.handle_message("m1,0");
    robot.handle_message("m0,1");
    assert_eq!(robot.controller().target(), Vector2::new(1.0, 1.0));
}

#[test]
fn mixed_modality_targets() {
    let mut robot = robot();
    robot.handle_message("GCODEG90\nG1 X5 Y5\nG91\nG1 X1\nM2\n");
    let program = robot.player().program();
    assert_eq!(
        program.get(0),
        Some(&Instruction::Linear(Vector2::new(5.0, 5.0)))
    );
    assert_eq!(
        program.get(1),
        Some(&Instruction::Linear(Vector2::new(6.0, 5.0)))
    );
}
