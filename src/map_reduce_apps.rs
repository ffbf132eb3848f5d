use crate::common::MapReduceApp;
use crate::parser::parse_line;

/// Range of the leading IPv4 octet.
pub const KEY_SPACE: usize = 256;

/// Counts requests per client IP.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestCount;

impl MapReduceApp for RequestCount {
    fn map(&self, line: &str) -> Option<String> {
        parse_line(line).map(|rec| rec.ip.to_string())
    }

    fn partition_key(&self, key: &str) -> i64 {
        leading_int(key)
    }

    fn key_space(&self) -> usize {
        KEY_SPACE
    }
}

/// Integer prefix of `s`: optional whitespace, optional sign, digits.
/// No digits gives 0.
pub fn leading_int(s: &str) -> i64 {
    let s = s.trim_start();
    let (neg, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let value = rest
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, d| {
            acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
        });
    if neg {
        -value
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_line_to_ip() {
        let app = RequestCount;
        assert_eq!(
            app.map("2024-01-01,10.0.0.1,GET,/x,200"),
            Some("10.0.0.1".to_string())
        );
        assert_eq!(app.map("2024-01-01,10.0.0.1,GET"), None);
    }

    #[test]
    fn leading_octet() {
        assert_eq!(leading_int("10.0.0.1"), 10);
        assert_eq!(leading_int("255.1.1.1"), 255);
        assert_eq!(leading_int("0.0.0.0"), 0);
        assert_eq!(leading_int("  7.0.0.1"), 7);
        assert_eq!(leading_int("-3.x"), -3);
        assert_eq!(leading_int("999.1.1.1"), 999);
    }

    #[test]
    fn non_numeric_prefix_is_zero() {
        assert_eq!(leading_int("localhost"), 0);
        assert_eq!(leading_int(""), 0);
        assert_eq!(leading_int("::1"), 0);
    }

    #[test]
    fn key_space_is_one_octet() {
        assert_eq!(RequestCount.key_space(), 256);
        assert_eq!(RequestCount.partition_key("192.168.0.1"), 192);
    }
}
