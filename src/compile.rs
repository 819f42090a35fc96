use std::collections::HashMap;
use std::fmt::Write as _;

use crate::config::Lexing;
use crate::parse::{self, ParseError, Token};
use crate::{Ast, BinOp, CompileError, Node, NodeId, NodeSource};

/// Builds node graphs from postfix token streams, reusing structurally
/// identical nodes.
///
/// The dedup scope is the builder itself: every postfix sequence pushed into
/// one builder shares nodes with the sequences pushed before it. A push
/// that fails leaves the builder exactly as it was before the push.
#[derive(Debug, Default)]
pub struct AstBuilder {
    nodes: Vec<Node>,
    interned: HashMap<Node, NodeId>,
}

impl AstBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one expression and return its root.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::InsufficientOperands`] when an operator finds
    /// fewer than two operands, and [`CompileError::MalformedExpression`]
    /// when the stream does not reduce to exactly one root.
    pub fn push_postfix<'a>(
        &mut self,
        postfix: impl IntoIterator<Item = Token<'a>>,
    ) -> Result<NodeId, CompileError> {
        let mark = self.nodes.len();
        let result = self.reduce(postfix);
        if result.is_err() {
            self.nodes.truncate(mark);
            self.interned.retain(|_, id| id.index() < mark);
        }
        result
    }

    fn reduce<'a>(
        &mut self,
        postfix: impl IntoIterator<Item = Token<'a>>,
    ) -> Result<NodeId, CompileError> {
        let mut stack: Vec<NodeId> = Vec::new();

        for token in postfix {
            let id = match token {
                Token::Operand(text) => self.intern(classify(text)),
                Token::Op(op) => {
                    // top of stack is the right operand
                    let (Some(right), Some(left)) = (stack.pop(), stack.pop()) else {
                        return Err(CompileError::InsufficientOperands { operator: op });
                    };
                    self.intern(Node::Operator { op, left, right })
                }
                Token::LParen => return Err(ParseError::UnmatchedOpeningParen.into()),
                Token::RParen => return Err(ParseError::ExtraClosingParen.into()),
            };
            stack.push(id);
        }

        match stack.as_slice() {
            [root] => Ok(*root),
            roots => Err(CompileError::MalformedExpression { roots: roots.len() }),
        }
    }

    fn intern(&mut self, node: Node) -> NodeId {
        if let Some(&id) = self.interned.get(&node) {
            return id;
        }
        let id = NodeId::from_index(self.nodes.len());
        self.interned.insert(node.clone(), id);
        self.nodes.push(node);
        id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Freeze the nodes built so far into an [`Ast`] rooted at `root`.
    #[must_use]
    pub fn into_ast(self, root: NodeId) -> Ast {
        Ast {
            nodes: self.nodes,
            root,
        }
    }
}

impl NodeSource for AstBuilder {
    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }
}

/// Quoted tokens and tokens that parse as a float are literals; everything
/// else names a variable. Quote characters are stripped from the value.
fn classify(text: &str) -> Node {
    let quoted = text.starts_with('"') || text.starts_with('\'');
    let value = text.trim_matches(|c| c == '"' || c == '\'');
    if quoted || value.parse::<f64>().is_ok() {
        Node::Literal(value.to_owned())
    } else {
        Node::Variable(value.to_owned())
    }
}

/// Build a standalone [`Ast`] from one postfix sequence.
///
/// # Errors
///
/// See [`AstBuilder::push_postfix`].
pub fn build_ast<'a>(postfix: impl IntoIterator<Item = Token<'a>>) -> Result<Ast, CompileError> {
    let mut builder = AstBuilder::new();
    let root = builder.push_postfix(postfix)?;
    Ok(builder.into_ast(root))
}

/// A rule string taken through the whole pipeline, ready to hand to a store.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSource {
    pub ast: Ast,
    /// The infix tokens, rendered back to their source text.
    pub tokens: Vec<String>,
}

/// Tokenize, convert to postfix, and build the AST for one rule string.
///
/// # Errors
///
/// Returns [`CompileError`] on any lexical, syntax, or structural problem.
pub fn compile_source(source: &str, lexing: Lexing) -> Result<CompiledSource, CompileError> {
    let (tokens, postfix) = parse::parse(source, lexing)?;
    let ast = build_ast(postfix)?;
    tracing::trace!(nodes = ast.len(), tokens = tokens.len(), "built ast");
    Ok(CompiledSource {
        ast,
        tokens: tokens.iter().map(ToString::to_string).collect(),
    })
}

/// Join rule strings into one synthetic rule: each is parenthesised and the
/// connectives are interleaved, so `[r0, r1, r2]` with `[op0, op1]` becomes
/// `"(r0) op0 (r1) op1 (r2)"`. An empty operator list means `AND` throughout.
///
/// # Errors
///
/// Fails before looking at any rule text when fewer than two rules are
/// given, when the operator count is neither zero nor one less than the rule
/// count, or when an operator is not a connective.
pub fn combine_sources<R, O>(rules: &[R], operators: &[O]) -> Result<String, CompileError>
where
    R: AsRef<str>,
    O: AsRef<str>,
{
    if rules.len() < 2 {
        return Err(CompileError::TooFewRules { count: rules.len() });
    }
    if !operators.is_empty() && operators.len() != rules.len() - 1 {
        return Err(CompileError::OperatorCount {
            rules: rules.len(),
            operators: operators.len(),
        });
    }

    let connectives = operators
        .iter()
        .map(|op| {
            let op = op.as_ref();
            op.parse::<BinOp>()
                .ok()
                .filter(|parsed| parsed.is_connective())
                .ok_or_else(|| CompileError::InvalidConnective {
                    operator: op.to_owned(),
                })
        })
        .collect::<Result<Vec<BinOp>, CompileError>>()?;

    let mut combined = format!("({})", rules[0].as_ref());
    for (i, rule) in rules.iter().enumerate().skip(1) {
        let op = connectives.get(i - 1).copied().unwrap_or(BinOp::And);
        // writing to a String cannot fail
        let _ = write!(combined, " {op} ({})", rule.as_ref());
    }
    Ok(combined)
}
