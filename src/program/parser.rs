// Streaming G-code parser
//
// Line-oriented, case-sensitive first token. The absolute/relative modality
// and the running target position live in the parser itself and persist
// across calls, so feeding a program line by line (streamed upload) parses
// identically to feeding it in one shot.

use nalgebra::Vector2;
use tracing::warn;

use super::instruction::{Instruction, Program};
use super::scan;

pub struct GcodeParser {
    absolute: bool,
    position: Vector2<f64>,
}

impl Default for GcodeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl GcodeParser {
    pub fn new() -> Self {
        Self {
            absolute: true,
            position: Vector2::zeros(),
        }
    }

    /// Parse `input` into `program`, appending.
    ///
    /// Lines end at `\n` or `\\`. Content after `;` is a comment. Malformed
    /// lines are skipped with a diagnostic. Stops once the program is full;
    /// the return value is the number of bytes consumed, so callers can
    /// report how much input was dropped.
    pub fn parse_into(&mut self, input: &str, program: &mut Program) -> usize {
        let mut rest = input;
        loop {
            if program.is_full() {
                break;
            }
            if rest.trim().is_empty() {
                rest = "";
                break;
            }

            let (line, next) = match rest.find(['\n', '\\']) {
                Some(pos) => (&rest[..pos], &rest[pos + 1..]),
                None => (rest, ""),
            };
            rest = next;

            // Strip the comment, if any, then surrounding whitespace.
            let line = line.split(';').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }

            if let Some(instruction) = self.parse_line(line) {
                program.push(instruction);
            }
        }
        input.len() - rest.len()
    }

    /// Parse one trimmed, comment-free line. Mode switches (G90/G91) mutate
    /// the parser and produce no instruction.
    fn parse_line(&mut self, line: &str) -> Option<Instruction> {
        if let Some(args) = line.strip_prefix("G0 ") {
            return match self.parse_move(args) {
                Some(target) => Some(Instruction::Rapid(target)),
                None => {
                    warn!("failed to parse gcode line: {line}");
                    None
                }
            };
        }
        if let Some(args) = line.strip_prefix("G1 ") {
            return match self.parse_move(args) {
                Some(target) => Some(Instruction::Linear(target)),
                None => {
                    warn!("failed to parse gcode line: {line}");
                    None
                }
            };
        }
        if let Some(args) = line.strip_prefix("G4 ") {
            let dwell = args
                .trim_start()
                .strip_prefix('P')
                .and_then(scan::parse_number)
                .filter(|ms| *ms >= 0.0);
            return match dwell {
                Some(ms) => Some(Instruction::Dwell(ms)),
                None => {
                    warn!("failed to parse gcode line: {line}");
                    None
                }
            };
        }
        if line.starts_with("G28") {
            return Some(Instruction::Home);
        }
        if line.starts_with("G90") {
            self.absolute = true;
            return None;
        }
        if line.starts_with("G91") {
            self.absolute = false;
            return None;
        }
        if line.starts_with("M2") || line.starts_with("M30") {
            return Some(Instruction::End);
        }
        if line.starts_with("M3") {
            return Some(Instruction::PenDown);
        }
        if line.starts_with("M5") {
            return Some(Instruction::PenUp);
        }

        warn!("failed to parse gcode line: {line}");
        None
    }

    /// Parse `X`/`Y` axis words and fold them into the running target.
    /// Absolute mode assigns; relative mode accumulates. The running target
    /// is only updated when the whole line parses.
    fn parse_move(&mut self, args: &str) -> Option<Vector2<f64>> {
        let mut x = None;
        let mut y = None;

        let mut rest = args.trim_start();
        while !rest.is_empty() {
            let axis = match rest.as_bytes()[0] {
                b'x' | b'X' => &mut x,
                b'y' | b'Y' => &mut y,
                _ => return None,
            };
            rest = &rest[1..];
            *axis = Some(scan::take_float(&mut rest)?);
            rest = rest.trim();
        }

        if self.absolute {
            if let Some(value) = x {
                self.position.x = value;
            }
            if let Some(value) = y {
                self.position.y = value;
            }
        } else {
            if let Some(value) = x {
                self.position.x += value;
            }
            if let Some(value) = y {
                self.position.y += value;
            }
        }
        Some(self.position)
    }
}
