// Instruction set and the bounded program that holds it

use nalgebra::Vector2;

use crate::config::MAX_INSTRUCTIONS;

/// One parsed motion instruction. Immutable once produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Instruction {
    /// Non-drawing move: pen lifted for travel, restored afterwards
    Rapid(Vector2<f64>),

    /// Drawing move: pen left in its current state
    Linear(Vector2<f64>),

    PenUp,
    PenDown,

    /// Timed pause, milliseconds
    Dwell(f64),

    /// Move the pen tip to the origin
    Home,

    /// Stop playback
    End,
}

/// Capacity-bounded instruction sequence.
#[derive(Clone, Debug, Default)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    pub const CAPACITY: usize = MAX_INSTRUCTIONS;

    pub fn new() -> Self {
        Self {
            instructions: Vec::with_capacity(Self::CAPACITY),
        }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.instructions.len() >= Self::CAPACITY
    }

    /// Reads past the end return `None`: no active instruction.
    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    /// Append an instruction; returns false when capacity is exhausted.
    pub fn push(&mut self, instruction: Instruction) -> bool {
        if self.is_full() {
            return false;
        }
        self.instructions.push(instruction);
        true
    }

    pub fn clear(&mut self) {
        self.instructions.clear();
    }

    /// Append the trailing `End` unless the program is full or already
    /// terminated.
    pub fn seal(&mut self) {
        if self.instructions.last() != Some(&Instruction::End) {
            self.push(Instruction::End);
        }
    }

    /// Deterministic listing line for one instruction: index, kind, numeric
    /// parameters to two decimal places. Byte-for-byte reproducible.
    pub fn render_line(&self, index: usize) -> Option<String> {
        let line = match *self.instructions.get(index)? {
            Instruction::Rapid(t) => format!("{index:3}: RAPID   ({:.2}, {:.2})\n", t.x, t.y),
            Instruction::Linear(t) => format!("{index:3}: LINEAR  ({:.2}, {:.2})\n", t.x, t.y),
            Instruction::PenUp => format!("{index:3}: PEN UP\n"),
            Instruction::PenDown => format!("{index:3}: PEN DOWN\n"),
            Instruction::Dwell(ms) => format!("{index:3}: DWELL   ({ms:.2})\n"),
            Instruction::Home => format!("{index:3}: HOME\n"),
            Instruction::End => format!("{index:3}: END\n"),
        };
        Some(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_respects_capacity() {
        let mut program = Program::new();
        for _ in 0..Program::CAPACITY {
            assert!(program.push(Instruction::PenUp));
        }
        assert!(!program.push(Instruction::PenDown));
        assert_eq!(program.len(), Program::CAPACITY);
    }

    #[test]
    fn seal_terminates_once() {
        let mut program = Program::new();
        program.push(Instruction::Home);
        program.seal();
        program.seal();
        assert_eq!(program.len(), 2);
        assert_eq!(program.get(1), Some(&Instruction::End));
    }

    #[test]
    fn listing_lines_are_deterministic() {
        let mut program = Program::new();
        program.push(Instruction::Rapid(Vector2::new(1.0, -2.345)));
        program.push(Instruction::Dwell(500.0));
        assert_eq!(program.render_line(0).unwrap(), "  0: RAPID   (1.00, -2.35)\n");
        assert_eq!(program.render_line(1).unwrap(), "  1: DWELL   (500.00)\n");
        assert_eq!(program.render_line(2), None);
    }
}
