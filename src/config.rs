//! Engine configuration.

/// How the tokenizer treats characters that start no token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lexing {
    /// Skip them silently.
    #[default]
    Lenient,
    /// Fail with [`ParseError::UnexpectedInput`](crate::parse::ParseError::UnexpectedInput).
    Strict,
}

/// Settings for a [`RuleEngine`](crate::RuleEngine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Deepest operator nesting evaluation will follow before failing.
    pub max_depth: usize,

    pub lexing: Lexing,
}

impl EngineConfig {
    pub const DEFAULT_MAX_DEPTH: usize = 512;

    /// Lenient lexing with the default depth limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject stray characters instead of dropping them.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            lexing: Lexing::Strict,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_lexing(mut self, lexing: Lexing) -> Self {
        self.lexing = lexing;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            lexing: Lexing::Lenient,
        }
    }
}
