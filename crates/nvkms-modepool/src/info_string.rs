use std::fmt;

/// Caller-bounded diagnostic text.
///
/// `capacity` counts the bytes of the client's buffer, including a trailing NUL, so at most
/// `capacity - 1` bytes of text are ever retained. Lines that do not fit are truncated at a
/// character boundary. A capacity of zero discards everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoString {
    text: String,
    capacity: usize,
}

impl InfoString {
    /// Largest buffer a client may request.
    pub const MAX_LEN: usize = 2048;

    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.min(Self::MAX_LEN);
        Self {
            text: String::with_capacity(capacity.saturating_sub(1)),
            capacity,
        }
    }

    /// A sink that accepts and drops every line.
    pub fn discard() -> Self {
        Self::new(0)
    }

    pub fn is_discarding(&self) -> bool {
        self.capacity == 0
    }

    /// Appends one formatted line followed by `'\n'`.
    pub fn log(&mut self, args: fmt::Arguments<'_>) {
        if self.is_discarding() {
            return;
        }
        let mut line = fmt::format(args);
        line.push('\n');

        let room = self.capacity - 1 - self.text.len();
        if line.len() > room {
            let mut cut = room;
            while !line.is_char_boundary(cut) {
                cut -= 1;
            }
            line.truncate(cut);
        }
        self.text.push_str(&line);
        debug_assert!(self.text.len() < self.capacity);
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Bytes the client buffer receives, terminator included. Zero when discarding.
    pub fn len_written(&self) -> usize {
        if self.is_discarding() {
            0
        } else {
            self.text.len() + 1
        }
    }

    pub fn into_string(self) -> String {
        self.text
    }
}
