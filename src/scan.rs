//! Byte scanner for the tile JSON. Each nesting level of the document runs its own
//! [`ScanState`] over a shared [`Cursor`] and stops once its own depth returns to zero.
//!
//! Numbers are runs of ASCII digits and `.`; signs and exponents are not recognised, so
//! `-0.12` scans as `0.12`. Strings end at the first `"` not preceded by a backslash, and
//! `\"` is the only escape that is translated.

pub fn is_number(byte: u8) -> bool {
    byte.is_ascii_digit() || byte == b'.'
}

/// Depth bookkeeping for one nesting level.
#[derive(Debug, Clone)]
pub struct ScanState {
    bracket_depth: i32,
    array_depth: i32,
    in_string: bool,
    previous: u8,
}

impl Default for ScanState {
    fn default() -> Self {
        ScanState {
            bracket_depth: 0,
            array_depth: 0,
            in_string: false,
            previous: b' ',
        }
    }
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, byte: u8) {
        if !self.in_string {
            match byte {
                b'{' => self.bracket_depth += 1,
                b'}' => self.bracket_depth -= 1,
                b'[' => self.array_depth += 1,
                b']' => self.array_depth -= 1,
                _ => (),
            }
        }
        if byte == b'"' && self.previous != b'\\' {
            self.flip_in_string();
        }
        self.previous = byte;
    }

    /// Nothing open and not inside a string.
    pub fn is_in_valid_state(&self) -> bool {
        self.array_depth == 0 && self.bracket_depth == 0 && !self.in_string
    }

    pub fn flip_in_string(&mut self) {
        self.in_string = !self.in_string;
    }

    /// For when a nested parser consumed the `{` this level counted and will also consume its `}`.
    pub fn undo_bracket_increment(&mut self) {
        self.bracket_depth -= 1;
    }

    pub fn bracket_depth(&self) -> i32 {
        self.bracket_depth
    }

    pub fn array_depth(&self) -> i32 {
        self.array_depth
    }

    pub fn in_string(&self) -> bool {
        self.in_string
    }
}

/// Position in the document text. Token readers leave the cursor on the last byte they
/// consumed, so the caller's loop steps past it with [`Cursor::advance`].
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    text: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Cursor {
            text: text.as_bytes(),
            pos: 0,
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn peek(&self) -> Option<u8> {
        self.text.get(self.pos).copied()
    }

    pub fn advance(&mut self) {
        self.pos += 1;
    }

    /// Moves back one byte so the caller's next `advance` lands on the current byte again.
    pub fn step_back(&mut self) {
        self.pos = self.pos.saturating_sub(1);
    }

    /// From the closing quote of a key, moves onto the first byte of its value.
    pub fn seek_to_value(&mut self) {
        self.pos += 1;
        while let Some(byte) = self.peek() {
            if byte.is_ascii_whitespace() || byte == b':' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    pub fn seek_to_next_number(&mut self) {
        while let Some(byte) = self.peek() {
            if is_number(byte) {
                break;
            }
            self.pos += 1;
        }
    }

    /// Reads the number token starting here. An empty token leaves the cursor one byte back.
    pub fn number_token(&mut self) -> &'a str {
        let text = self.text;
        let start = self.pos;
        let mut end = start;
        while end < text.len() && is_number(text[end]) {
            end += 1;
        }
        self.pos = if end > start { end - 1 } else { start.saturating_sub(1) };
        // Digits and '.' are ASCII, so the slice is valid UTF-8.
        std::str::from_utf8(text.get(start..end).unwrap_or_default()).unwrap_or_default()
    }

    pub fn parse_f64(&mut self) -> f64 {
        parse_decimal(self.number_token())
    }

    pub fn parse_i64(&mut self) -> i64 {
        parse_integer(self.number_token())
    }

    /// Reads a string whose opening quote is under the cursor, leaving the cursor on the
    /// closing quote (or past the end for an unterminated string).
    pub fn parse_string(&mut self) -> String {
        let text = self.text;
        let start = self.pos + 1;
        let mut end = start;
        while end < text.len() && !(text[end] == b'"' && text[end - 1] != b'\\') {
            end += 1;
        }
        self.pos = end;
        let raw = &text[start.min(text.len())..end.min(text.len())];
        String::from_utf8_lossy(raw).replace("\\\"", "\"")
    }
}

/// `atof`-like: the longest prefix with at most one '.', or zero.
pub fn parse_decimal(token: &str) -> f64 {
    let end = token.match_indices('.').nth(1).map_or(token.len(), |(idx, _)| idx);
    token[..end].parse().unwrap_or(0.0)
}

/// `atoi`-like: the digits before the first '.', or zero.
pub fn parse_integer(token: &str) -> i64 {
    token.split('.').next().unwrap_or_default().parse().unwrap_or(0)
}
