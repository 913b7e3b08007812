// Instruction programs: parsing, storage, playback, listing
//
// Provides:
// - The typed instruction set and its capacity-bounded program storage
// - A streaming G-code parser and the numeric field scanner under it
// - The per-tick playback state machine
// - Chunk-tolerant line reassembly and resumable listing retrieval

mod instruction;
mod listing;
mod parser;
mod player;
pub mod scan;
mod stream;

pub use instruction::{Instruction, Program};
pub use listing::{ListingCursor, render_full};
pub use parser::GcodeParser;
pub use player::Player;
pub use stream::LineAssembler;
