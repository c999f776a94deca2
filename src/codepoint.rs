// GlyphScene
// copyright glyphscene contributors 2023～2026

//! Lightweight UTF-8 decoding tied to glyph layout.  This is deliberately
//! not a conformant validator: continuation bytes are consumed without
//! checking their `10xxxxxx` form, so malformed input yields either the
//! invalid sentinel (on truncation) or a garbage codepoint.  The walker
//! guarantees forward progress over arbitrary byte soup.

pub type Codepoint = u32;

/// Sentinel for failed decodes.
pub const INVALID_CODEPOINT: Codepoint = Codepoint::MAX;

const ASCII_END: u8 = 0x80;

/// A decoded codepoint plus its byte span `[first, last)` in the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodepointResult {
    pub codepoint: Codepoint,
    pub first: usize,
    pub last: usize,
}

pub const INVALID: CodepointResult = CodepointResult {
    codepoint: INVALID_CODEPOINT,
    first: 0,
    last: 0,
};

/// Decodes the UTF-8 sequence beginning at byte offset `start`.
///
/// The continuation-byte count comes from the number of leading one bits of
/// the first byte:
///
/// U+0080   U+07FF       110xxxxx  10xxxxxx
/// U+0800   U+FFFF       1110xxxx  10xxxxxx  10xxxxxx
/// U+10000  U+10FFFF     11110xxx  10xxxxxx  10xxxxxx  10xxxxxx
pub fn next_codepoint(input: &[u8], start: usize) -> CodepointResult {
    if start >= input.len() {
        return INVALID;
    }
    let first = input[start];
    // ASCII never has the high bit set: 0xxxxxxx.
    if first & ASCII_END == 0 {
        return CodepointResult {
            codepoint: Codepoint::from(first),
            first: start,
            last: start + 1,
        };
    }

    let count = first.leading_ones() as usize;
    // count - 1 is how many bytes to consume after this one.  A bare
    // continuation byte (count == 1) has no valid decoding.
    if count <= 1 {
        return INVALID;
    }
    let count = count - 1;
    // Cannot go past the end.
    if start + count >= input.len() {
        return INVALID;
    }
    // Chop the header bits (one more than 'count' to drop the top-most
    // UTF-8 marker bit as well).
    let header_mask = 0xFFu32 >> (count + 1);
    let mut result = Codepoint::from(first) & header_mask;
    for i in 0..count {
        let c = input[start + 1 + i];
        result <<= 6;
        // Only the lower 6 bits of 10xxxxxx matter.
        result |= Codepoint::from(c & 0x3f);
    }
    CodepointResult {
        codepoint: result,
        first: start,
        last: start + count + 1,
    }
}

pub fn non_ascii_codepoint(c: u8) -> bool {
    c & ASCII_END != 0
}

/// True for bytes of the form 10xxxxxx, i.e. any non-leading UTF-8 byte.
pub fn trailing_codepoint_byte(c: u8) -> bool {
    if !non_ascii_codepoint(c) {
        return false;
    }
    c & 0x40 == 0
}

pub fn ascii_codepoint(cp: Codepoint) -> bool {
    cp < Codepoint::from(ASCII_END)
}

/// Number of codepoints (valid or not) from `start` to the end of input.
pub fn codepoint_count(input: &[u8], start: usize) -> usize {
    let mut walker = CodepointWalker::with_offset(input, start);
    let mut count = 0;
    while !walker.exhausted() {
        walker.next();
        count += 1;
    }
    count
}

/// Stateful forward-only cursor over the codepoints of a byte string.
/// Always advances by at least one byte, even over invalid sequences, so
/// iteration terminates within `len` steps.
pub struct CodepointWalker<'a> {
    text: &'a [u8],
    current: usize,
}

impl<'a> CodepointWalker<'a> {
    pub fn new(text: &'a str) -> Self {
        Self::with_offset(text.as_bytes(), 0)
    }

    pub fn with_offset(text: &'a [u8], start: usize) -> Self {
        Self {
            text,
            current: start,
        }
    }

    pub fn next(&mut self) -> Codepoint {
        self.next_result().codepoint
    }

    pub fn next_result(&mut self) -> CodepointResult {
        let result = next_codepoint(self.text, self.current);
        if result == INVALID {
            // Just advance.
            self.current += 1;
        } else {
            self.current = result.last;
        }
        result
    }

    /// `>=` so a constructor offset past the end starts exhausted instead
    /// of never terminating.
    pub fn exhausted(&self) -> bool {
        self.current >= self.text.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_single_byte_span() {
        let r = next_codepoint(b"Az", 0);
        assert_eq!(r.codepoint, 'A' as u32);
        assert_eq!((r.first, r.last), (0, 1));
    }

    #[test]
    fn two_and_three_byte_sequences() {
        // U+00E9 'é' = 0xC3 0xA9, U+20AC '€' = 0xE2 0x82 0xAC.
        let text = "é€".as_bytes();
        let r = next_codepoint(text, 0);
        assert_eq!(r.codepoint, 0xE9);
        assert_eq!((r.first, r.last), (0, 2));
        let r = next_codepoint(text, 2);
        assert_eq!(r.codepoint, 0x20AC);
        assert_eq!((r.first, r.last), (2, 5));
    }

    #[test]
    fn four_byte_sequence() {
        let text = "𝄞".as_bytes();
        let r = next_codepoint(text, 0);
        assert_eq!(r.codepoint, 0x1D11E);
        assert_eq!(r.last, 4);
    }

    #[test]
    fn bare_continuation_byte_is_invalid() {
        assert_eq!(next_codepoint(&[0xA9], 0), INVALID);
    }

    #[test]
    fn truncated_sequence_is_invalid() {
        // Leading byte promises two continuation bytes, only one present.
        assert_eq!(next_codepoint(&[0xE2, 0x82], 0), INVALID);
    }

    #[test]
    fn start_past_end_is_invalid() {
        assert_eq!(next_codepoint(b"a", 1), INVALID);
        assert_eq!(next_codepoint(b"", 0), INVALID);
    }

    #[test]
    fn walker_terminates_over_garbage() {
        // Mixed valid prefix and trailing garbage; must exhaust within
        // len(bytes) steps.
        let bytes: &[u8] = &[b'a', 0xC3, 0xA9, 0xFF, 0x80, 0x80];
        let mut walker = CodepointWalker::with_offset(bytes, 0);
        let mut steps = 0;
        while !walker.exhausted() {
            walker.next();
            steps += 1;
            assert!(steps <= bytes.len());
        }
        assert!(walker.exhausted());
    }

    #[test]
    fn walker_yields_codepoints_in_order() {
        let mut walker = CodepointWalker::new("a€b");
        assert_eq!(walker.next(), 'a' as u32);
        assert_eq!(walker.next(), 0x20AC);
        assert_eq!(walker.next(), 'b' as u32);
        assert!(walker.exhausted());
    }

    #[test]
    fn byte_class_helpers() {
        assert!(!non_ascii_codepoint(b'a'));
        assert!(non_ascii_codepoint(0xC3));
        assert!(trailing_codepoint_byte(0xA9));
        assert!(!trailing_codepoint_byte(0xC3));
        assert!(!trailing_codepoint_byte(b'a'));
        assert!(ascii_codepoint('a' as u32));
        assert!(!ascii_codepoint(0x20AC));
    }

    #[test]
    fn codepoint_count_counts_invalid_bytes_once() {
        assert_eq!(codepoint_count("a€b".as_bytes(), 0), 3);
        assert_eq!(codepoint_count(&[0xFF, 0xFF], 0), 2);
        assert_eq!(codepoint_count(b"", 0), 0);
    }

    #[test]
    fn offset_past_the_end_starts_exhausted() {
        let walker = CodepointWalker::with_offset(b"ab", 5);
        assert!(walker.exhausted());
        // Counting from a bad offset terminates at zero instead of spinning.
        assert_eq!(codepoint_count(b"ab", 5), 0);
    }
}
