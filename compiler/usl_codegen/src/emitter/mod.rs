//! Output sinks for the text backends.

/// Destination of generated text.
///
/// Backends render a complete file before touching the emitter, so a
/// failed generation never leaves half a shader behind.
pub trait Emitter {
    fn emit(&mut self, text: &str);

    /// Emit a newline (Unix-style `\n`).
    fn emit_newline(&mut self);

    /// Emit indentation as the given number of spaces.
    fn emit_indent(&mut self, spaces: usize);
}

/// In-memory emitter.
#[derive(Default, Debug)]
pub struct StringEmitter {
    buffer: String,
}

impl StringEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: String::with_capacity(capacity),
        }
    }

    /// Current contents without consuming.
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Ensure the output ends with a single newline.
    pub fn ensure_trailing_newline(&mut self) {
        while self.buffer.ends_with("\n\n") {
            self.buffer.pop();
        }
        if !self.buffer.is_empty() && !self.buffer.ends_with('\n') {
            self.buffer.push('\n');
        }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn output(self) -> String {
        self.buffer
    }
}

impl Emitter for StringEmitter {
    fn emit(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn emit_newline(&mut self) {
        self.buffer.push('\n');
    }

    fn emit_indent(&mut self, spaces: usize) {
        for _ in 0..spaces {
            self.buffer.push(' ');
        }
    }
}

impl Emitter for String {
    fn emit(&mut self, text: &str) {
        self.push_str(text);
    }

    fn emit_newline(&mut self) {
        self.push('\n');
    }

    fn emit_indent(&mut self, spaces: usize) {
        self.push_str(&" ".repeat(spaces));
    }
}

/// Feed rendered `text` to `out` line by line, leading spaces as
/// indentation.
pub fn emit_lines(out: &mut dyn Emitter, text: &str) {
    for line in text.lines() {
        let content = line.trim_start_matches(' ');
        out.emit_indent(line.len() - content.len());
        out.emit(content);
        out.emit_newline();
    }
}
