use super::EncodingError;

// Supported range: normalized exponent in [-12, 12], at most 10
// significant digits. Values outside are a configuration error — the
// codec never silently widens.
const MIN_EXPONENT: i32 = -12;
const MAX_EXPONENT: i32 = 12;
const EXPONENT_SPAN: i32 = MAX_EXPONENT - MIN_EXPONENT;
const MAX_DIGITS: usize = 10;

// Leading marker digit. Negative < zero < positive under plain string
// comparison.
const MARKER_NEGATIVE: char = '1';
const MARKER_ZERO: char = '2';
const MARKER_POSITIVE: char = '3';

/// Width of every encoded value: marker + 2 exponent digits + mantissa.
pub(crate) const ENCODED_WIDTH: usize = 1 + 2 + MAX_DIGITS;

/// Encode a real number as a fixed-width decimal string whose
/// lexicographic order equals numeric order.
///
/// Layout: `[marker][biased exponent: 2][mantissa digits: 10]`.
/// Positive numbers store the exponent biased by `-MIN_EXPONENT` and
/// the mantissa digits zero-padded on the right; negative numbers store
/// the nines complement of both, so that the more negative value yields
/// the smaller string. Zero is a lone marker with zero padding.
pub fn encode(n: f64) -> Result<String, EncodingError> {
    if !n.is_finite() {
        return Err(EncodingError::NumericOutOfRange(n));
    }
    if n == 0.0 {
        let mut out = String::with_capacity(ENCODED_WIDTH);
        out.push(MARKER_ZERO);
        for _ in 0..ENCODED_WIDTH - 1 {
            out.push('0');
        }
        return Ok(out);
    }

    let (digits, exponent) = decompose(n.abs());
    if digits.len() > MAX_DIGITS || !(MIN_EXPONENT..=MAX_EXPONENT).contains(&exponent) {
        return Err(EncodingError::NumericOutOfRange(n));
    }
    let biased = exponent - MIN_EXPONENT;

    let mut out = String::with_capacity(ENCODED_WIDTH);
    if n > 0.0 {
        out.push(MARKER_POSITIVE);
        push_two_digits(&mut out, biased);
        out.push_str(&digits);
        for _ in digits.len()..MAX_DIGITS {
            out.push('0');
        }
    } else {
        out.push(MARKER_NEGATIVE);
        push_two_digits(&mut out, EXPONENT_SPAN - biased);
        for d in digits.bytes() {
            out.push(char::from(b'0' + (9 - (d - b'0'))));
        }
        for _ in digits.len()..MAX_DIGITS {
            out.push('9');
        }
    }
    Ok(out)
}

fn push_two_digits(out: &mut String, n: i32) {
    out.push(char::from(b'0' + (n / 10) as u8));
    out.push(char::from(b'0' + (n % 10) as u8));
}

/// Split a positive finite float into its significant digits and
/// normalized exponent, via the shortest round-trip scientific form
/// (`2.01e1` → `("201", 1)`).
fn decompose(x: f64) -> (String, i32) {
    let formatted = format!("{x:e}");
    let (mantissa, exponent) = formatted
        .split_once('e')
        .unwrap_or((formatted.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);
    (digits, exponent)
}
