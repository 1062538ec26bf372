/// Iteration state over a directive's targets.
///
/// Starts before the first target; `advance` steps onto the next one and
/// reports whether there was one.
#[derive(Debug, Clone, Default)]
pub struct TargetCursor {
    len: usize,
    next: usize,
    current: Option<usize>,
}

impl TargetCursor {
    pub fn new(len: usize) -> Self {
        TargetCursor {
            len,
            next: 0,
            current: None,
        }
    }

    pub fn advance(&mut self) -> bool {
        if self.next < self.len {
            self.current = Some(self.next);
            self.next += 1;
            true
        } else {
            self.current = None;
            false
        }
    }

    pub fn reset(&mut self) {
        self.next = 0;
        self.current = None;
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::TargetCursor;

    #[test]
    fn walks_every_target_once() {
        let mut cursor = TargetCursor::new(3);
        let mut seen = Vec::new();
        while cursor.advance() {
            seen.push(cursor.current_index().unwrap());
        }
        assert_eq!(seen, vec![0, 1, 2]);
        assert_eq!(cursor.current_index(), None);
    }

    #[test]
    fn reset_starts_over() {
        let mut cursor = TargetCursor::new(2);
        while cursor.advance() {}
        cursor.reset();
        assert!(cursor.advance());
        assert_eq!(cursor.current_index(), Some(0));
    }

    #[test]
    fn empty_cursor_never_advances() {
        let mut cursor = TargetCursor::new(0);
        assert!(cursor.is_empty());
        assert!(!cursor.advance());
    }
}
