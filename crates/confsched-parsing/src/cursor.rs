use confsched_core::TextLine;

/// A forward cursor over a materialized line stream with single-line
/// backtracking.
///
/// The scan consumes lines with [`advance`](Self::advance); when a sub-scan
/// recognizes a boundary line that belongs to the next phase, it calls
/// [`unread`](Self::unread) so the caller re-examines that line. Termination
/// is guaranteed: every loop iteration either consumes a line or returns
/// after at most one unread.
#[derive(Debug)]
pub struct LineCursor<'a> {
    lines: &'a [TextLine],
    pos: usize,
}

impl<'a> LineCursor<'a> {
    pub fn new(lines: &'a [TextLine]) -> Self {
        Self { lines, pos: 0 }
    }

    /// The next line, without consuming it.
    pub fn peek(&self) -> Option<&'a TextLine> {
        self.lines.get(self.pos)
    }

    /// Consume and return the next line.
    pub fn advance(&mut self) -> Option<&'a TextLine> {
        let line = self.lines.get(self.pos)?;
        self.pos += 1;
        Some(line)
    }

    /// Step back one line so the most recently consumed line is re-examined.
    pub fn unread(&mut self) {
        debug_assert!(self.pos > 0, "unread before any advance");
        self.pos = self.pos.saturating_sub(1);
    }

    /// Index of the next line to be consumed.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.lines.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(texts: &[&str]) -> Vec<TextLine> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| TextLine::new(*t, 100.0, i as f64 * 12.0, i as f64 * 12.0 + 10.0))
            .collect()
    }

    #[test]
    fn advance_walks_in_order() {
        let lines = lines(&["a", "b", "c"]);
        let mut cursor = LineCursor::new(&lines);
        assert_eq!(cursor.advance().unwrap().text, "a");
        assert_eq!(cursor.advance().unwrap().text, "b");
        assert_eq!(cursor.advance().unwrap().text, "c");
        assert!(cursor.advance().is_none());
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn peek_does_not_consume() {
        let lines = lines(&["a", "b"]);
        let mut cursor = LineCursor::new(&lines);
        assert_eq!(cursor.peek().unwrap().text, "a");
        assert_eq!(cursor.peek().unwrap().text, "a");
        assert_eq!(cursor.advance().unwrap().text, "a");
        assert_eq!(cursor.peek().unwrap().text, "b");
    }

    #[test]
    fn unread_re_examines_last_line() {
        let lines = lines(&["a", "b"]);
        let mut cursor = LineCursor::new(&lines);
        cursor.advance();
        cursor.advance();
        cursor.unread();
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.advance().unwrap().text, "b");
    }

    #[test]
    fn exhausted_on_empty_input() {
        let lines: Vec<TextLine> = Vec::new();
        let mut cursor = LineCursor::new(&lines);
        assert!(cursor.is_exhausted());
        assert!(cursor.peek().is_none());
        assert!(cursor.advance().is_none());
    }
}
