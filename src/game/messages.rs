//! Player-facing message log.

use serde::{Deserialize, Serialize};

/// Append-only list of log lines.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageLog {
    lines: Vec<String>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines appended since the log had `mark` entries.
    pub fn since(&self, mark: usize) -> &[String] {
        self.lines.get(mark..).unwrap_or(&[])
    }

    /// The last `count` lines, for a scrolling window.
    pub fn tail(&self, count: usize) -> &[String] {
        let start = self.lines.len().saturating_sub(count);
        &self.lines[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_since_and_tail() {
        let mut log = MessageLog::new();
        log.push("one");
        let mark = log.len();
        log.push("two");
        log.push(String::from("three"));

        assert_eq!(log.since(mark), ["two".to_string(), "three".to_string()]);
        assert_eq!(log.since(10), [] as [String; 0]);
        assert_eq!(log.tail(1), ["three".to_string()]);
        assert_eq!(log.tail(10).len(), 3);
    }
}
