//! PostgREST query filters

use std::fmt;

/// Filter operators used by the sync
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Neq,
}

impl FilterOp {
    fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Neq => "neq",
        }
    }
}

/// `column=<op>.<value>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: String,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl ToString) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::Eq,
            value: value.to_string(),
        }
    }

    pub fn neq(column: impl Into<String>, value: impl ToString) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::Neq,
            value: value.to_string(),
        }
    }

    /// Query-string pair, value percent-encoded
    pub fn to_query(&self) -> String {
        format!(
            "{}={}.{}",
            urlencoding::encode(&self.column),
            self.op.as_str(),
            urlencoding::encode(&self.value)
        )
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.column, self.op.as_str(), self.value)
    }
}

/// Join filters into a query string (without the leading `?`)
pub fn query_string(select: Option<&str>, filters: &[Filter]) -> String {
    let mut parts = Vec::new();
    if let Some(select) = select {
        parts.push(format!("select={}", urlencoding::encode(select)));
    }
    parts.extend(filters.iter().map(Filter::to_query));
    parts.join("&")
}

/// Total row count from a `Content-Range` header (`0-9/123` or `*/123`)
pub fn parse_content_range(header: &str) -> Option<u64> {
    let (_, total) = header.trim().rsplit_once('/')?;
    total.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_query() {
        assert_eq!(Filter::eq("part", 1).to_query(), "part=eq.1");
        assert_eq!(Filter::neq("id", 0).to_query(), "id=neq.0");
        assert_eq!(Filter::eq("is_split", true).to_query(), "is_split=eq.true");
        assert_eq!(Filter::eq("section", "4 1").to_query(), "section=eq.4%201");
    }

    #[test]
    fn test_query_string() {
        assert_eq!(
            query_string(Some("*"), &[Filter::eq("part", 2)]),
            "select=%2A&part=eq.2"
        );
        assert_eq!(query_string(None, &[]), "");
    }

    #[test]
    fn test_parse_content_range() {
        assert_eq!(parse_content_range("0-9/123"), Some(123));
        assert_eq!(parse_content_range("*/0"), Some(0));
        assert_eq!(parse_content_range("0-9/*"), None);
        assert_eq!(parse_content_range("garbage"), None);
    }
}
