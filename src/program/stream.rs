// Reassembles lines from arbitrarily fragmented input chunks
//
// The transport may split a line anywhere. A partial trailing line is kept
// as leftover and completed by later chunks; only whole lines reach the
// handler. Fragmentation is recovered transparently, never surfaced as an
// error.

#[derive(Debug, Default)]
pub struct LineAssembler {
    leftover: String,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk, invoking `handle` for every completed line
    /// (delimiter not included).
    pub fn push_chunk(&mut self, chunk: &str, mut handle: impl FnMut(&str)) {
        let mut input = chunk;

        // Complete the pending partial line first.
        if !self.leftover.is_empty() {
            match input.find('\n') {
                None => {
                    self.leftover.push_str(input);
                    return;
                }
                Some(pos) => {
                    self.leftover.push_str(&input[..pos]);
                    input = &input[pos + 1..];
                    let line = std::mem::take(&mut self.leftover);
                    handle(&line);
                }
            }
        }

        // Hand over complete lines; keep the unterminated tail.
        match input.rfind('\n') {
            Some(end) => {
                self.leftover = input[end + 1..].to_string();
                for line in input[..end].split('\n') {
                    handle(line);
                }
            }
            None => self.leftover.push_str(input),
        }
    }

    /// Flush a trailing line that never saw its delimiter.
    pub fn finish(&mut self, mut handle: impl FnMut(&str)) {
        if !self.leftover.is_empty() {
            let line = std::mem::take(&mut self.leftover);
            handle(&line);
        }
    }

    pub fn has_partial(&self) -> bool {
        !self.leftover.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(chunks: &[&str]) -> Vec<String> {
        let mut assembler = LineAssembler::new();
        let mut lines = Vec::new();
        for chunk in chunks {
            assembler.push_chunk(chunk, |line| lines.push(line.to_string()));
        }
        assembler.finish(|line| lines.push(line.to_string()));
        lines
    }

    #[test]
    fn whole_lines_pass_through() {
        assert_eq!(collect(&["a\nb\n"]), vec!["a", "b"]);
    }

    #[test]
    fn split_lines_are_reassembled() {
        assert_eq!(collect(&["G1 X", "5\nG1", " Y2\n"]), vec!["G1 X5", "G1 Y2"]);
    }

    #[test]
    fn unterminated_tail_flushes_on_finish() {
        let mut assembler = LineAssembler::new();
        let mut lines = Vec::new();
        assembler.push_chunk("a\nb", |line| lines.push(line.to_string()));
        assert!(assembler.has_partial());
        assembler.finish(|line| lines.push(line.to_string()));
        assert!(!assembler.has_partial());
        assert_eq!(lines, vec!["a", "b"]);
    }

    #[test]
    fn any_split_yields_the_same_lines() {
        let text = "G1 X1\nG1 X2\nM2\n";
        let whole = collect(&[text]);
        for split in 1..text.len() {
            let (head, tail) = text.split_at(split);
            assert_eq!(collect(&[head, tail]), whole, "split at {split}");
        }
    }

    #[test]
    fn empty_lines_survive() {
        assert_eq!(collect(&["a\n", "\n", "b\n"]), vec!["a", "", "b"]);
    }
}
