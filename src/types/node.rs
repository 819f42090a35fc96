use std::fmt;

use super::op::BinOp;

/// Stable handle to a node inside an arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "binary-cache", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn from_index(index: usize) -> Self {
        NodeId(index as u32)
    }

    pub(crate) fn offset(self, by: usize) -> Self {
        NodeId::from_index(self.index() + by)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A vertex of a rule's expression graph.
///
/// Operator children are handles, so the derived `Hash`/`Eq` compare
/// `(variant, value, left, right)`: two nodes are equal exactly when they
/// are structurally the same within one arena.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "binary-cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Node {
    /// A constant, stored without surrounding quotes.
    Literal(String),
    /// A key resolved against the input record at evaluation time.
    Variable(String),
    Operator {
        op: BinOp,
        left: NodeId,
        right: NodeId,
    },
}

impl Node {
    #[must_use]
    pub fn children(&self) -> Option<(NodeId, NodeId)> {
        match self {
            Node::Operator { left, right, .. } => Some((*left, *right)),
            Node::Literal(_) | Node::Variable(_) => None,
        }
    }

    /// Shift child handles by `by`, used when an arena is appended to another.
    pub(crate) fn rebased(self, by: usize) -> Node {
        match self {
            Node::Operator { op, left, right } => Node::Operator {
                op,
                left: left.offset(by),
                right: right.offset(by),
            },
            leaf => leaf,
        }
    }
}

/// Read access to nodes by handle. Implemented by [`Ast`] and by
/// every storage backend.
pub trait NodeSource {
    fn node(&self, id: NodeId) -> Option<&Node>;

    /// Render the graph below `root` as a fully parenthesised infix string.
    fn display(&self, root: NodeId) -> NodeDisplay<'_, Self>
    where
        Self: Sized,
    {
        NodeDisplay { source: self, root }
    }
}

/// The nodes produced by one build, plus the root handle of the last
/// expression built.
///
/// Handles are indices into `nodes`; children always precede their parents.
#[derive(Debug, Clone, PartialEq)]
pub struct Ast {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
}

impl Ast {
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }
}

impl NodeSource for Ast {
    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.display(self.root).fmt(f)
    }
}

/// Infix rendering of a node graph. Created by [`NodeSource::display`].
pub struct NodeDisplay<'a, S> {
    source: &'a S,
    root: NodeId,
}

enum Piece {
    Node(NodeId),
    Op(BinOp),
    Close,
}

fn write_leaf(f: &mut fmt::Formatter<'_>, node: Option<&Node>, id: NodeId) -> fmt::Result {
    match node {
        Some(Node::Literal(value)) => {
            if value.trim().parse::<f64>().is_ok() {
                write!(f, "{value}")
            } else {
                write!(f, "'{value}'")
            }
        }
        Some(Node::Variable(name)) => write!(f, "{name}"),
        Some(Node::Operator { .. }) => Ok(()),
        None => write!(f, "<missing {id}>"),
    }
}

impl<S: NodeSource> fmt::Display for NodeDisplay<'_, S> {
    // explicit stack: graph depth is unbounded here
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pending = vec![Piece::Node(self.root)];
        while let Some(piece) = pending.pop() {
            match piece {
                Piece::Node(id) => match self.source.node(id) {
                    Some(Node::Operator { op, left, right }) => {
                        f.write_str("(")?;
                        pending.push(Piece::Close);
                        pending.push(Piece::Node(*right));
                        pending.push(Piece::Op(*op));
                        pending.push(Piece::Node(*left));
                    }
                    node => write_leaf(f, node, id)?,
                },
                Piece::Op(op) => write!(f, " {op} ")?,
                Piece::Close => f.write_str(")")?,
            }
        }
        Ok(())
    }
}
