//! Literal forms of scalar values.

use std::fmt::Write;

/// Double-quote `text`, escaping quotes, backslashes and non-printable
/// characters.
pub(crate) fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{07}' => out.push_str("\\a"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0B}' => out.push_str("\\v"),
            c if is_printable(c) => out.push(c),
            c if (c as u32) < 0x80 => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c if (c as u32) < 0x10000 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => {
                let _ = write!(out, "\\U{:08x}", c as u32);
            }
        }
    }
    out.push('"');
    out
}

/// Approximates the graphic-character test: controls, separators other than
/// the ASCII space, format characters, private use and noncharacters are not
/// printable.
fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    if c.is_control() || c.is_whitespace() {
        return false;
    }
    !matches!(
        c as u32,
        0xAD | 0x600..=0x605
            | 0x61C
            | 0x6DD
            | 0x70F
            | 0x180E
            | 0x200B..=0x200F
            | 0x202A..=0x202E
            | 0x2060..=0x206F
            | 0xE000..=0xF8FF
            | 0xFEFF
            | 0xFFF9..=0xFFFB
            | 0xFFFE..=0xFFFF
            | 0xF0000..=0x10FFFF
    )
}

pub(crate) fn float64(x: f64) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }
    shortest(&format!("{:e}", x))
}

pub(crate) fn float32(x: f32) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }
    // `{:e}` on the f32 itself keeps the shortest f32 digits.
    shortest(&format!("{:e}", x))
}

/// `complex64(re+imi)`, where `bits` is the width of the whole number.
pub(crate) fn complex(bits: u32, re: &str, im: &str) -> String {
    let sign = if im.starts_with('-') || im.starts_with('+') {
        ""
    } else {
        "+"
    };
    format!("complex{}({}{}{}i)", bits, re, sign, im)
}

/// Re-layout the shortest round-trip digits from `{:e}` output.
///
/// Plain decimal notation is used while the decimal exponent lies in
/// `-4..6`, otherwise `d.ddde±XX` with at least two exponent digits.
fn shortest(sci: &str) -> String {
    let (mantissa, exp) = match sci.split_once('e') {
        Some((mantissa, exp)) => (mantissa, exp.parse::<i32>().unwrap_or(0)),
        None => (sci, 0),
    };
    let (negative, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, mantissa),
    };
    let digits: Vec<u8> = mantissa.bytes().filter(u8::is_ascii_digit).collect();

    let mut out = String::new();
    if negative {
        out.push('-');
    }

    if !(-4..6).contains(&exp) {
        out.push(digits[0] as char);
        if digits.len() > 1 {
            out.push('.');
            out.extend(digits[1..].iter().map(|&d| d as char));
        }
        let _ = write!(out, "e{}{:02}", if exp < 0 { '-' } else { '+' }, exp.abs());
        return out;
    }

    // Number of digits before the decimal point.
    let point = exp + 1;
    if point <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat('0').take(point.unsigned_abs() as usize));
        out.extend(digits.iter().map(|&d| d as char));
        return out;
    }

    let point = point as usize;
    for i in 0..point {
        out.push(digits.get(i).map_or('0', |&d| d as char));
    }
    if digits.len() > point {
        out.push('.');
        out.extend(digits[point..].iter().map(|&d| d as char));
    }
    out
}
