//! Trigger offset computation.
//!
//! The withheld byte is the last byte of a completely framed request:
//!
//! - no `\r\n\r\n` at all: the last byte of the blob
//! - header block without a usable `Content-Length`: the final `\n` of the
//!   header terminator (any body bytes go out with the prefix)
//! - usable `Content-Length: n`: the last byte of the declared body
//!
//! A declared length larger than the bytes following the header block is
//! ignored, so the offset is always a valid index.

use crate::core::constants::{CONTENT_LENGTH, HEADER_TERMINATOR, LINE_SEPARATOR};

/// Compute the index of the byte to withhold until release.
///
/// `request` must be non-empty; an empty slice yields 0, which is not a
/// valid index. Use [`RequestTemplate`](super::RequestTemplate) to enforce
/// the precondition.
pub fn locate_trigger(request: &[u8]) -> usize {
    let last = request.len().saturating_sub(1);

    let Some(idx) = find(request, HEADER_TERMINATOR) else {
        return last;
    };

    let body_len = request.len() - (idx + HEADER_TERMINATOR.len());
    match content_length(&request[..idx], body_len) {
        Some(cl) => {
            let pos = idx + HEADER_TERMINATOR.len() + cl;
            // cl == 0 declares an empty body: fall back onto the terminator.
            let pos = pos.saturating_sub(1);
            if pos < request.len() { pos } else { last }
        }
        None => idx + HEADER_TERMINATOR.len() - 1,
    }
}

/// Last syntactically valid `Content-Length` value that fits in `body_len`.
fn content_length(headers: &[u8], body_len: usize) -> Option<usize> {
    let mut found = None;
    for line in split(headers, LINE_SEPARATOR) {
        if line.is_empty() {
            continue;
        }
        let Some(colon) = line.iter().position(|&b| b == b':') else {
            continue;
        };
        let name = line[..colon].trim_ascii();
        if !name.eq_ignore_ascii_case(CONTENT_LENGTH.as_bytes()) {
            continue;
        }
        if let Some(value) = parse_length(line[colon + 1..].trim_ascii()) {
            if value <= body_len {
                found = Some(value);
            }
        }
    }
    found
}

/// Parse an unsigned decimal. Rejects signs, whitespace inside the digits,
/// and values that overflow `usize`.
fn parse_length(value: &[u8]) -> Option<usize> {
    if value.is_empty() || !value.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(value).ok()?.parse().ok()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn split<'a>(mut data: &'a [u8], sep: &'a [u8]) -> impl Iterator<Item = &'a [u8]> + 'a {
    let mut done = false;
    std::iter::from_fn(move || {
        if done {
            return None;
        }
        match find(data, sep) {
            Some(at) => {
                let line = &data[..at];
                data = &data[at + sep.len()..];
                Some(line)
            }
            None => {
                done = true;
                Some(data)
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terminator_index(request: &[u8]) -> usize {
        find(request, HEADER_TERMINATOR).unwrap()
    }

    #[test]
    fn test_get_without_body() {
        let request = b"GET / HTTP/1.1\r\nHost: x\r\n\r\n";
        let offset = locate_trigger(request);

        assert_eq!(offset, terminator_index(request) + 3);
        assert_eq!(offset, request.len() - 1);
        assert_eq!(request[offset], b'\n');
    }

    #[test]
    fn test_content_length_body() {
        let request = b"POST /transfer HTTP/1.1\r\nHost: x\r\nContent-Length: 5\r\n\r\nABCDE";
        let offset = locate_trigger(request);

        assert_eq!(offset, terminator_index(request) + 4 + 5 - 1);
        assert_eq!(request[offset], b'E');
        assert_eq!(&request[..offset], &request[..request.len() - 1]);
    }

    #[test]
    fn test_content_length_shorter_than_body() {
        // Trailing bytes past the declared body are not part of the split.
        let request = b"POST / HTTP/1.1\r\ncontent-length: 3\r\n\r\nABCDEF";
        let offset = locate_trigger(request);

        assert_eq!(request[offset], b'C');
        assert_eq!(offset, terminator_index(request) + 4 + 2);
    }

    #[test]
    fn test_oversized_content_length_rejected() {
        let request = b"POST / HTTP/1.1\r\nContent-Length: 999999\r\n\r\nshort";
        let idx = terminator_index(request);

        let offset = locate_trigger(request);
        assert_eq!(offset, idx + 3);
        assert!(offset < request.len());
    }

    #[test]
    fn test_last_valid_content_length_wins() {
        let request =
            b"POST / HTTP/1.1\r\nContent-Length: 2\r\nContent-Length: 4\r\n\r\nABCDEFGH";
        assert_eq!(request[locate_trigger(request)], b'D');

        // An oversized later value does not displace an earlier valid one.
        let request =
            b"POST / HTTP/1.1\r\nContent-Length: 2\r\nContent-Length: 4000\r\n\r\nABCDEFGH";
        assert_eq!(request[locate_trigger(request)], b'B');

        // Neither does garbage.
        let request =
            b"POST / HTTP/1.1\r\nContent-Length: 3\r\nContent-Length: -1\r\n\r\nABCDEFGH";
        assert_eq!(request[locate_trigger(request)], b'C');
    }

    #[test]
    fn test_header_name_matching() {
        let request = b"POST / HTTP/1.1\r\nCONTENT-LENGTH:   2  \r\n\r\nAB";
        assert_eq!(request[locate_trigger(request)], b'B');

        let request = b"POST / HTTP/1.1\r\nX-Content-Length: 2\r\n\r\nABCD";
        assert_eq!(locate_trigger(request), terminator_index(request) + 3);
    }

    #[test]
    fn test_invalid_content_length_values() {
        for value in ["abc", "", "+5", "1 2", "99999999999999999999999999"] {
            let request = format!("POST / HTTP/1.1\r\nContent-Length: {value}\r\n\r\nABCDE");
            let request = request.as_bytes();
            assert_eq!(
                locate_trigger(request),
                terminator_index(request) + 3,
                "value {value:?}"
            );
        }
    }

    #[test]
    fn test_zero_content_length() {
        let request = b"POST / HTTP/1.1\r\nContent-Length: 0\r\n\r\n";
        let offset = locate_trigger(request);
        assert_eq!(offset, request.len() - 1);
        assert_eq!(request[offset], b'\n');
    }

    #[test]
    fn test_no_terminator() {
        assert_eq!(locate_trigger(b"opaque payload"), 13);
        assert_eq!(locate_trigger(b"GET / HTTP/1.1\r\nHost: x\r\n"), 24);
        assert_eq!(locate_trigger(b"x"), 0);
    }

    #[test]
    fn test_terminator_only() {
        assert_eq!(locate_trigger(b"\r\n\r\n"), 3);
    }

    #[test]
    fn test_offset_always_in_bounds() {
        let samples: &[&[u8]] = &[
            b"a",
            b"\r\n\r\n",
            b"\r\n\r\nbody",
            b"Content-Length: 1\r\n\r\n",
            b"Content-Length: 1\r\n\r\nX",
            b"Content-Length: 2\r\n\r\nX",
            b":\r\n:\r\n\r\n",
            b"GET / HTTP/1.1\r\n\r\n\r\n\r\n",
        ];
        for sample in samples {
            assert!(locate_trigger(sample) < sample.len(), "{sample:?}");
        }
    }

    #[test]
    fn test_split_lines() {
        let lines: Vec<&[u8]> = split(b"a\r\nb\r\n\r\nc", LINE_SEPARATOR).collect();
        assert_eq!(lines, vec![&b"a"[..], &b"b"[..], &b""[..], &b"c"[..]]);
    }
}
