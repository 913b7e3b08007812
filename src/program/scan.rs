// Numeric field scanning over line buffers
//
// All scanners operate on a `&mut &str`, consuming what they accept and
// leaving the remainder in place, so callers can chain fields. The
// exact-match helpers reject trailing garbage, mirroring the strictness of
// the command surface.

/// Consume a signed decimal number (`-12`, `+3.5`, `.25`, `7.`).
pub fn take_float(input: &mut &str) -> Option<f64> {
    *input = input.trim_start();
    let bytes = input.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut has_digit = end > int_start;

    if bytes.get(end) == Some(&b'.') {
        end += 1;
        let frac_start = end;
        while bytes.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
        }
        has_digit |= end > frac_start;
    }

    if !has_digit {
        return None;
    }
    let value = input[..end].parse().ok()?;
    *input = &input[end..];
    Some(value)
}

/// Consume a signed decimal integer.
pub fn take_int(input: &mut &str) -> Option<i64> {
    *input = input.trim_start();
    let bytes = input.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let digit_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }

    if end == digit_start {
        return None;
    }
    let value = input[..end].parse().ok()?;
    *input = &input[end..];
    Some(value)
}

/// Parse a line holding exactly one number and nothing else.
pub fn parse_number(line: &str) -> Option<f64> {
    let mut rest = line;
    let value = take_float(&mut rest)?;
    rest.trim().is_empty().then_some(value)
}

/// Parse a line holding exactly two comma-separated numbers.
pub fn parse_pair(line: &str) -> Option<(f64, f64)> {
    let mut rest = line;
    let first = take_float(&mut rest)?;
    rest = rest.trim_start().strip_prefix(',')?;
    let second = take_float(&mut rest)?;
    rest.trim().is_empty().then_some((first, second))
}

/// Parse a line holding exactly two comma-separated integers.
pub fn parse_int_pair(line: &str) -> Option<(i64, i64)> {
    let mut rest = line;
    let first = take_int(&mut rest)?;
    rest = rest.trim_start().strip_prefix(',')?;
    let second = take_int(&mut rest)?;
    rest.trim().is_empty().then_some((first, second))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_signed_decimals() {
        let mut s = "-12.5 rest";
        assert_eq!(take_float(&mut s), Some(-12.5));
        assert_eq!(s, " rest");

        let mut s = "+.25";
        assert_eq!(take_float(&mut s), Some(0.25));

        let mut s = "7.";
        assert_eq!(take_float(&mut s), Some(7.0));
    }

    #[test]
    fn rejects_non_numbers() {
        let mut s = "abc";
        assert_eq!(take_float(&mut s), None);
        assert_eq!(s, "abc");

        let mut s = "-.";
        assert_eq!(take_float(&mut s), None);

        let mut s = "";
        assert_eq!(take_float(&mut s), None);
    }

    #[test]
    fn take_int_stops_at_dot() {
        let mut s = "42.5";
        assert_eq!(take_int(&mut s), Some(42));
        assert_eq!(s, ".5");
    }

    #[test]
    fn pair_requires_exact_match() {
        assert_eq!(parse_pair("1.5, -2"), Some((1.5, -2.0)));
        assert_eq!(parse_pair("  3 ,4  "), Some((3.0, 4.0)));
        assert_eq!(parse_pair("1.5"), None);
        assert_eq!(parse_pair("1,2,3"), None);
        assert_eq!(parse_pair("1,2 junk"), None);
    }

    #[test]
    fn int_pair_rejects_fractions() {
        assert_eq!(parse_int_pair("100,-200"), Some((100, -200)));
        assert_eq!(parse_int_pair("1.5,2"), None);
    }

    #[test]
    fn single_number_requires_exact_match() {
        assert_eq!(parse_number(" 500 "), Some(500.0));
        assert_eq!(parse_number("500 ms"), None);
    }
}
