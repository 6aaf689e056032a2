#![deny(missing_docs)]

//! # Code Writer
//!
//! Line-oriented output buffer with an indentation level.

/// Accumulates source lines.
#[derive(Debug, Clone)]
pub struct CodeWriter {
    buffer: String,
    level: usize,
    unit: &'static str,
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new("  ")
    }
}

impl CodeWriter {
    /// A writer indenting with `unit` per level.
    pub fn new(unit: &'static str) -> Self {
        Self {
            buffer: String::new(),
            level: 0,
            unit,
        }
    }

    /// Writes one line at the current indentation. Embedded newlines are
    /// indented too.
    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        for part in text.as_ref().split('\n') {
            if !part.is_empty() {
                for _ in 0..self.level {
                    self.buffer.push_str(self.unit);
                }
                self.buffer.push_str(part);
            }
            self.buffer.push('\n');
        }
        self
    }

    /// Writes an empty line.
    pub fn blank(&mut self) -> &mut Self {
        self.buffer.push('\n');
        self
    }

    /// Writes `text` and increases the indentation.
    pub fn open(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.line(text);
        self.indent()
    }

    /// Decreases the indentation and writes `text`.
    pub fn close(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.dedent();
        self.line(text)
    }

    /// One level deeper.
    pub fn indent(&mut self) -> &mut Self {
        self.level += 1;
        self
    }

    /// One level shallower; saturates at zero.
    pub fn dedent(&mut self) -> &mut Self {
        self.level = self.level.saturating_sub(1);
        self
    }

    /// The current indentation level.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Consumes the writer.
    pub fn finish(self) -> String {
        self.buffer
    }
}
