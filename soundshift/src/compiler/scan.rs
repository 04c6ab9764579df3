//! Depth-aware scanning over `[ ]` and `( )` nesting
//!
//! All offsets are byte offsets into the scanned text. The delimiters handled here
//! are ASCII, so offsets always fall on character boundaries.

/// Byte offset of the delimiter closing the one at `open`
///
/// Both bracket kinds are tracked so that `[` inside `( )` and vice versa nest properly.
/// Returns `None` if the text ends first or a closer of the wrong kind appears.
pub fn find_matching(text: &str, open: usize) -> Option<usize> {
    let mut stack: Vec<u8> = Vec::new();

    for (offset, byte) in text.bytes().enumerate().skip(open) {
        match byte {
            b'[' | b'(' => stack.push(byte),
            b']' | b')' => {
                let expected = if byte == b']' { b'[' } else { b'(' };
                if stack.pop() != Some(expected) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(offset);
                }
            }
            _ => {}
        }
    }

    None
}

/// Offsets of every occurrence of `needle` outside all brackets and parentheses
pub fn find_top_level(text: &str, needle: u8) -> Vec<usize> {
    let mut depth: usize = 0;
    let mut found = Vec::new();

    for (offset, byte) in text.bytes().enumerate() {
        match byte {
            b'[' | b'(' => depth += 1,
            b']' | b')' => depth = depth.saturating_sub(1),
            _ if byte == needle && depth == 0 => found.push(offset),
            _ => {}
        }
    }

    found
}

/// Whether every bracket and parenthesis is closed by its own kind
pub fn is_balanced(text: &str) -> bool {
    let mut stack: Vec<u8> = Vec::new();
    for byte in text.bytes() {
        match byte {
            b'[' | b'(' => stack.push(byte),
            b']' => {
                if stack.pop() != Some(b'[') {
                    return false;
                }
            }
            b')' => {
                if stack.pop() != Some(b'(') {
                    return false;
                }
            }
            _ => {}
        }
    }
    stack.is_empty()
}

/// Collapse runs of whitespace into single spaces and trim the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
