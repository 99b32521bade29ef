/// Splits the raw byte stream into complete lines.
/// Bytes after the last newline stay buffered until the next chunk arrives.
#[derive(Debug, Default)]
pub struct LineFramer {
    pending: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Feed a chunk of bytes and return every line it completes.
    /// Lines end on `\n`; a preceding `\r` is stripped. Invalid UTF-8 is
    /// replaced rather than dropped so a noisy byte cannot lose a reading.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &byte in chunk {
            if byte == b'\n' {
                if self.pending.last() == Some(&b'\r') {
                    self.pending.pop();
                }
                lines.push(String::from_utf8_lossy(&self.pending).into_owned());
                self.pending.clear();
            } else {
                self.pending.push(byte);
            }
        }
        lines
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_lines_across_chunks() {
        let mut framer = LineFramer::new();
        assert!(framer.push(b"supine,0.1").is_empty());
        assert_eq!(framer.pending_len(), 10);

        let lines = framer.push(b",0.2\nprone");
        assert_eq!(lines, vec!["supine,0.1,0.2"]);
        assert_eq!(framer.pending_len(), 5);
    }

    #[test]
    fn strips_carriage_returns() {
        let mut framer = LineFramer::new();
        let lines = framer.push(b"a,b\r\nc,d\r\n");
        assert_eq!(lines, vec!["a,b", "c,d"]);
        assert_eq!(framer.pending_len(), 0);
    }

    #[test]
    fn several_lines_in_one_chunk() {
        let mut framer = LineFramer::new();
        let lines = framer.push(b"1\n2\n3\n");
        assert_eq!(lines, vec!["1", "2", "3"]);
    }

    #[test]
    fn empty_lines_come_through() {
        let mut framer = LineFramer::new();
        let lines = framer.push(b"\n\r\n");
        assert_eq!(lines, vec!["", ""]);
    }

    #[test]
    fn invalid_utf8_is_replaced_not_dropped() {
        let mut framer = LineFramer::new();
        let lines = framer.push(b"supine,\xff\x01\n");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("supine,"));
        assert!(lines[0].contains(char::REPLACEMENT_CHARACTER));
    }
}
