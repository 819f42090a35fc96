//! Storage of compiled rules and their node graphs.
//!
//! [`RuleStore`] is the seam between the engine and whatever persists
//! rules. [`MemoryStore`] is the in-process implementation: one node arena
//! shared by every rule, plus an id-ordered rule table and a name index.

use std::collections::{BTreeMap, HashMap};

use crate::{Ast, Node, NodeId, NodeSource, Rule, RuleId, RuleRef, StoreError};

/// A window over the rule list, ordered by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

impl Page {
    pub const DEFAULT_LIMIT: usize = 50;

    #[must_use]
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    /// Every rule in one page.
    #[must_use]
    pub fn all() -> Self {
        Self::new(0, usize::MAX)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(0, Self::DEFAULT_LIMIT)
    }
}

/// Persistence contract for rules.
///
/// Implementations own the node graph of every rule they hold and must make
/// [`insert`](RuleStore::insert) and [`replace`](RuleStore::replace) atomic:
/// either the whole AST becomes visible with the rule, or nothing changes.
pub trait RuleStore: NodeSource {
    /// Store a new rule built from `ast`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateName`] if `name` is already taken.
    fn insert(
        &mut self,
        ast: Ast,
        tokens: Vec<String>,
        name: Option<String>,
    ) -> Result<RuleId, StoreError>;

    /// Point an existing rule at a freshly built AST, keeping its id and name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RuleNotFound`] if no rule has this id.
    fn replace(&mut self, id: RuleId, ast: Ast, tokens: Vec<String>) -> Result<(), StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError::RuleNotFound`] for an unknown id or name.
    fn get(&self, rule: &RuleRef) -> Result<&Rule, StoreError>;

    fn list(&self, page: Page) -> Vec<&Rule>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory [`RuleStore`].
///
/// Nodes are append-only between calls to [`sweep`](MemoryStore::sweep).
/// Each inserted AST keeps its own nodes; structure is shared within one
/// rule but not across rules.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub(crate) nodes: Vec<Node>,
    pub(crate) rules: BTreeMap<RuleId, Rule>,
    pub(crate) names: HashMap<String, RuleId>,
    pub(crate) last_id: u64,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes in the arena, reachable or not.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Move `ast` onto the end of the arena and return its rebased root.
    fn append(&mut self, ast: Ast) -> NodeId {
        let offset = self.nodes.len();
        let root = ast.root().offset(offset);
        self.nodes
            .extend(ast.into_nodes().into_iter().map(|node| node.rebased(offset)));
        root
    }

    /// Drop nodes no rule can reach and compact the arena.
    ///
    /// Edits leave the replaced graph behind; this reclaims it. Handles
    /// held outside the store are invalidated. Returns the number of nodes
    /// removed.
    pub fn sweep(&mut self) -> usize {
        let mut live = vec![false; self.nodes.len()];
        for rule in self.rules.values() {
            if let Some(slot) = live.get_mut(rule.root.index()) {
                *slot = true;
            }
        }
        // children precede parents, so one backward pass marks everything
        for index in (0..self.nodes.len()).rev() {
            if !live[index] {
                continue;
            }
            if let Some((left, right)) = self.nodes[index].children() {
                for child in [left, right] {
                    if let Some(slot) = live.get_mut(child.index()) {
                        *slot = true;
                    }
                }
            }
        }

        let mut remap = vec![None; self.nodes.len()];
        let mut kept = Vec::with_capacity(live.iter().filter(|&&l| l).count());
        for (index, node) in std::mem::take(&mut self.nodes).into_iter().enumerate() {
            if !live[index] {
                continue;
            }
            let node = match node {
                Node::Operator { op, left, right } => Node::Operator {
                    op,
                    left: remapped(&remap, left),
                    right: remapped(&remap, right),
                },
                leaf => leaf,
            };
            remap[index] = Some(NodeId::from_index(kept.len()));
            kept.push(node);
        }

        let reclaimed = remap.len() - kept.len();
        self.nodes = kept;
        for rule in self.rules.values_mut() {
            if let Some(Some(root)) = remap.get(rule.root.index()) {
                rule.root = *root;
            }
        }
        tracing::trace!(reclaimed, remaining = self.nodes.len(), "swept node arena");
        reclaimed
    }
}

#[cfg(feature = "binary-cache")]
impl MemoryStore {
    /// Serialize every node and rule to a byte vector.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`](crate::SerializeError) if encoding fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, crate::SerializeError> {
        crate::serial::encode(self)
    }

    /// Restore a store from bytes produced by [`to_bytes`](Self::to_bytes).
    ///
    /// The payload is checked for integrity and structure (every child
    /// precedes its parent, roots are in range, names are unique) before
    /// anything is returned.
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`](crate::DeserializeError) on format,
    /// integrity, or validation failure.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, crate::DeserializeError> {
        crate::serial::decode(bytes)
    }

    /// # Errors
    ///
    /// Returns [`SerializeError`](crate::SerializeError) on encoding or I/O
    /// failure.
    pub fn to_binary_file(
        &self,
        path: impl AsRef<std::path::Path>,
    ) -> Result<(), crate::SerializeError> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`DeserializeError`](crate::DeserializeError) on I/O, format,
    /// integrity, or validation failure.
    pub fn from_binary_file(
        path: impl AsRef<std::path::Path>,
    ) -> Result<Self, crate::DeserializeError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}

fn remapped(remap: &[Option<NodeId>], id: NodeId) -> NodeId {
    remap.get(id.index()).copied().flatten().unwrap_or(id)
}

impl NodeSource for MemoryStore {
    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }
}

impl RuleStore for MemoryStore {
    fn insert(
        &mut self,
        ast: Ast,
        tokens: Vec<String>,
        name: Option<String>,
    ) -> Result<RuleId, StoreError> {
        if let Some(name) = &name {
            if self.names.contains_key(name) {
                return Err(StoreError::DuplicateName { name: name.clone() });
            }
        }

        let root = self.append(ast);
        self.last_id += 1;
        let id = RuleId(self.last_id);
        if let Some(name) = &name {
            self.names.insert(name.clone(), id);
        }
        self.rules.insert(
            id,
            Rule {
                id,
                name,
                root,
                tokens,
            },
        );
        Ok(id)
    }

    fn replace(&mut self, id: RuleId, ast: Ast, tokens: Vec<String>) -> Result<(), StoreError> {
        if !self.rules.contains_key(&id) {
            return Err(StoreError::RuleNotFound(RuleRef::Id(id)));
        }
        let root = self.append(ast);
        if let Some(rule) = self.rules.get_mut(&id) {
            rule.root = root;
            rule.tokens = tokens;
        }
        Ok(())
    }

    fn get(&self, rule: &RuleRef) -> Result<&Rule, StoreError> {
        let found = match rule {
            RuleRef::Id(id) => self.rules.get(id),
            RuleRef::Name(name) => self.names.get(name).and_then(|id| self.rules.get(id)),
        };
        found.ok_or_else(|| StoreError::RuleNotFound(rule.clone()))
    }

    fn list(&self, page: Page) -> Vec<&Rule> {
        self.rules
            .values()
            .skip(page.offset)
            .take(page.limit)
            .collect()
    }

    fn len(&self) -> usize {
        self.rules.len()
    }
}
