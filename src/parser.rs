//! Access-log line parser.
//!
//! A line is `date,ip,method,route,status` with bounded field widths.
//! Anything else is skipped.

use once_cell::sync::Lazy;
use regex::Regex;

pub const DATE_LEN: usize = 19;
pub const IP_LEN: usize = 15;
pub const METHOD_LEN: usize = 7;
pub const ROUTE_LEN: usize = 36;
pub const STATUS_LEN: usize = 3;

static LINE_RE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"^([^,]{{1,{DATE_LEN}}}),([^,]{{1,{IP_LEN}}}),([^,]{{1,{METHOD_LEN}}}),([^,]{{1,{ROUTE_LEN}}}),\s*([^,\s]{{1,{STATUS_LEN}}})\s*$"
    );
    Regex::new(&pattern).expect("invalid log line regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord<'a> {
    pub date: &'a str,
    pub ip: &'a str,
    pub method: &'a str,
    pub route: &'a str,
    pub status: &'a str,
}

pub fn parse_line(line: &str) -> Option<LogRecord<'_>> {
    let caps = LINE_RE.captures(line)?;
    let field = |i| caps.get(i).map(|m| m.as_str());
    Some(LogRecord {
        date: field(1)?,
        ip: field(2)?,
        method: field(3)?,
        route: field(4)?,
        status: field(5)?,
    })
}
