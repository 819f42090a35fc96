use std::fmt;

use super::node::NodeId;

/// Identifier assigned to a rule by its store. Ids start at 1 and are
/// never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "binary-cache", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleId(pub u64);

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A compiled rule as held by a store.
///
/// `tokens` is the lexical form of the source (or of the synthesized
/// source, for combined rules), kept for display and audit only.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "binary-cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Rule {
    pub id: RuleId,
    pub name: Option<String>,
    pub root: NodeId,
    pub tokens: Vec<String>,
}

/// Look a rule up either by id or by its unique name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleRef {
    Id(RuleId),
    Name(String),
}

impl From<RuleId> for RuleRef {
    fn from(id: RuleId) -> Self {
        RuleRef::Id(id)
    }
}

impl From<&str> for RuleRef {
    fn from(name: &str) -> Self {
        RuleRef::Name(name.to_owned())
    }
}

impl From<String> for RuleRef {
    fn from(name: String) -> Self {
        RuleRef::Name(name)
    }
}

impl fmt::Display for RuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleRef::Id(id) => write!(f, "id {id}"),
            RuleRef::Name(name) => write!(f, "name '{name}'"),
        }
    }
}
