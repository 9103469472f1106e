//! Widening of integer literals the decoder cannot hold.
//!
//! The relaxed-JSON decoder reads integer literals as 64-bit integers and
//! rejects a document containing one out of range. Such literals are
//! rewritten in exponent form so that they decode as floats, like every
//! other number in the tree. Strings and comments are left untouched.

/// Rewrite out-of-range integer literals in `text`, or `None` when there is
/// nothing to rewrite.
pub(crate) fn widen_integer_literals(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len() + 16);
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'"' | b'\'') => i = skip_string(bytes, i + 1, quote),
            b'/' if bytes.get(i + 1) == Some(&b'/') => i = skip_past(bytes, i + 2, b"\n"),
            b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_past(bytes, i + 2, b"*/"),
            b'0'..=b'9' | b'+' | b'-' | b'.' => {
                let end = number_end(bytes, i);
                if let Some(widened) = widen(&text[i..end]) {
                    out.push_str(&text[copied..i]);
                    out.push_str(&widened);
                    copied = end;
                }
                i = end.max(i + 1);
            }
            b if is_ident_byte(b) => {
                while i < bytes.len() && (is_ident_byte(bytes[i]) || bytes[i].is_ascii_digit()) {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }

    if copied == 0 {
        return None;
    }
    out.push_str(&text[copied..]);
    Some(out)
}

/// Identifier characters other than digits; non-ASCII bytes only occur in
/// identifiers outside of strings and comments.
fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80
}

fn skip_string(bytes: &[u8], mut i: usize, quote: u8) -> usize {
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn skip_past(bytes: &[u8], from: usize, terminator: &[u8]) -> usize {
    bytes[from.min(bytes.len())..]
        .windows(terminator.len())
        .position(|window| window == terminator)
        .map_or(bytes.len(), |pos| from + pos + terminator.len())
}

/// End of the number token starting at `start`, including a leading sign
/// and a signed exponent.
fn number_end(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    if matches!(bytes[i], b'+' | b'-') {
        i += 1;
    }
    let hex = matches!(bytes.get(i..i + 2), Some(b"0x" | b"0X"));

    while i < bytes.len() {
        let b = bytes[i];
        let exponent_sign =
            matches!(b, b'+' | b'-') && !hex && i > start && matches!(bytes[i - 1], b'e' | b'E');
        if b.is_ascii_alphanumeric() || b == b'.' || exponent_sign {
            i += 1;
        } else {
            break;
        }
    }
    i
}

/// Exponent form of an integer literal that does not fit in an `i64`.
fn widen(token: &str) -> Option<String> {
    let (negative, unsigned) = match token.as_bytes().first()? {
        b'-' => (true, &token[1..]),
        b'+' => (false, &token[1..]),
        _ => (false, token),
    };

    let magnitude = match unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        Some(hex) => {
            if hex.is_empty()
                || !hex.bytes().all(|b| b.is_ascii_hexdigit())
                || u64::from_str_radix(hex, 16).is_ok()
            {
                return None;
            }
            hex.bytes().fold(0.0_f64, |acc, b| {
                acc * 16.0 + f64::from((b as char).to_digit(16).unwrap_or(0))
            })
        }
        None => {
            if unsigned.is_empty()
                || !unsigned.bytes().all(|b| b.is_ascii_digit())
                || token.parse::<i64>().is_ok()
            {
                return None;
            }
            unsigned.parse::<f64>().ok()?
        }
    };

    let value = if negative { -magnitude } else { magnitude };
    Some(format!("{:e}", value))
}
