// Resumable chunked rendering of the program listing
//
// A transport with a bounded response size retrieves the listing in pieces,
// asking for successive byte offsets. The cursor remembers where the last
// chunk ended so the common sequential case never re-scans; an unexpected
// offset triggers one re-scan from the start. Whole lines only: a line that
// does not fit in the buffer is left for the next request.

use super::instruction::Program;

/// Caller-owned resume state for chunked listing retrieval.
#[derive(Debug, Default)]
pub struct ListingCursor {
    last_offset: usize,
    resume_index: usize,
}

impl ListingCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render listing bytes starting at `offset` into `buf`, returning the
    /// number of bytes written. Returns 0 once the listing is exhausted.
    pub fn render(&mut self, program: &Program, offset: usize, buf: &mut [u8]) -> usize {
        if offset != self.last_offset {
            // Re-scan to find the line containing `offset`.
            self.resume_index = 0;
            let mut line_start = 0;
            while let Some(line) = program.render_line(self.resume_index) {
                if line_start + line.len() > offset {
                    break;
                }
                line_start += line.len();
                self.resume_index += 1;
            }
        }

        let mut written = 0;
        while let Some(line) = program.render_line(self.resume_index) {
            let bytes = line.as_bytes();
            if written + bytes.len() > buf.len() {
                break;
            }
            buf[written..written + bytes.len()].copy_from_slice(bytes);
            written += bytes.len();
            self.resume_index += 1;
        }

        self.last_offset = offset + written;
        written
    }
}

/// Convenience: the full listing as one string.
pub fn render_full(program: &Program) -> String {
    let mut out = String::new();
    let mut index = 0;
    while let Some(line) = program.render_line(index) {
        out.push_str(&line);
        index += 1;
    }
    out
}
