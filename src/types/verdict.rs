use std::fmt;

/// The outcome of evaluating a rule, or any sub-expression of one.
///
/// `Unknown` is distinct from `Bool(false)`: it means a variable the
/// expression needed was absent from the record.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum Verdict {
    Bool(bool),
    Number(f64),
    /// Literal or record text that no operator has coerced yet.
    Text(String),
    Unknown,
}

impl Verdict {
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Verdict::Unknown)
    }

    /// Truthiness for logical contexts: non-zero numbers and non-empty text
    /// are true. Returns `None` for `Unknown`.
    #[must_use]
    pub fn truthiness(&self) -> Option<bool> {
        match self {
            Verdict::Bool(b) => Some(*b),
            Verdict::Number(n) => Some(*n != 0.0),
            Verdict::Text(s) => Some(!s.is_empty()),
            Verdict::Unknown => None,
        }
    }

    /// Numeric view of this value. Booleans count as `1`/`0`; text must
    /// parse as a float once surrounding whitespace is trimmed.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Verdict::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Verdict::Number(n) => Some(*n),
            Verdict::Text(s) => s.trim().parse().ok(),
            Verdict::Unknown => None,
        }
    }

    /// `=`/`==` semantics: numeric comparison when both sides are numeric,
    /// exact text comparison otherwise.
    #[allow(clippy::float_cmp)]
    pub(crate) fn loosely_equals(&self, other: &Verdict) -> bool {
        if let (Some(a), Some(b)) = (self.as_number(), other.as_number()) {
            return a == b;
        }
        match (self, other) {
            (Verdict::Text(a), Verdict::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Verdict {
    fn from(v: bool) -> Self {
        Verdict::Bool(v)
    }
}

impl From<f64> for Verdict {
    fn from(v: f64) -> Self {
        Verdict::Number(v)
    }
}

impl From<&str> for Verdict {
    fn from(v: &str) -> Self {
        Verdict::Text(v.to_owned())
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Bool(v) => write!(f, "{v}"),
            Verdict::Number(v) => write!(f, "{v}"),
            Verdict::Text(v) => write!(f, "\"{v}\""),
            Verdict::Unknown => f.write_str("unknown"),
        }
    }
}
