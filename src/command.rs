// Console command surface
//
// Single-character commands, one per line, with comma-separated numeric
// arguments. Parsing is separated from execution: lines become typed
// `Command` values which the runtime applies to its context, so malformed
// input is rejected before anything mutates.

use thiserror::Error;

use crate::program::scan;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// `P1` / `P0`: motor enable
    MotorsEnabled(bool),

    /// `S<r>,<l>`: raw integer joint targets, bypassing the controller
    SeekJoints(i64, i64),

    /// `d` / `u`: pen down / up
    Pen(bool),

    /// `R`: reset estimator, controller and player
    Reset,

    /// `m<dx>,<dy>`: move the setpoint relative to its current value
    MoveRelative(f64, f64),

    /// `M<x>,<y>`: absolute setpoint
    MoveAbsolute(f64, f64),

    /// `>` / `|`: resume / pause playback
    Play,
    Pause,

    /// `p`: emit the program listing
    PrintProgram,

    /// `?`: emit a status report
    Status,
}

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("empty command line")]
    Empty,

    #[error("unknown command `{0}`")]
    Unknown(char),

    #[error("malformed arguments for `{command}`: `{args}`")]
    BadArguments { command: char, args: String },
}

/// Parse one command line.
pub fn parse(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let mut chars = line.chars();
    let command = chars.next().ok_or(CommandError::Empty)?;
    let args = chars.as_str();

    let bad = || CommandError::BadArguments {
        command,
        args: args.to_string(),
    };

    match command {
        'P' => match args.trim().as_bytes().first() {
            Some(b'0') => Ok(Command::MotorsEnabled(false)),
            Some(b'1') => Ok(Command::MotorsEnabled(true)),
            _ => Err(bad()),
        },
        'S' => scan::parse_int_pair(args)
            .map(|(r, l)| Command::SeekJoints(r, l))
            .ok_or_else(bad),
        'u' => Ok(Command::Pen(false)),
        'd' => Ok(Command::Pen(true)),
        'R' => Ok(Command::Reset),
        'm' => scan::parse_pair(args)
            .map(|(dx, dy)| Command::MoveRelative(dx, dy))
            .ok_or_else(bad),
        'M' => scan::parse_pair(args)
            .map(|(x, y)| Command::MoveAbsolute(x, y))
            .ok_or_else(bad),
        '>' => Ok(Command::Play),
        '|' => Ok(Command::Pause),
        'p' => Ok(Command::PrintProgram),
        '?' => Ok(Command::Status),
        other => Err(CommandError::Unknown(other)),
    }
}
