use thiserror::Error;

use crate::parse::ParseError;

use super::op::BinOp;
use super::rule::RuleRef;

/// Failures while turning a rule string into an AST.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("invalid rule string: insufficient operands for operator '{operator}'")]
    InsufficientOperands { operator: BinOp },

    #[error("invalid rule string: expression left {roots} disconnected sub-expressions")]
    MalformedExpression { roots: usize },

    #[error("at least two rule strings are required to combine, got {count}")]
    TooFewRules { count: usize },

    #[error(
        "number of operators must be zero or one less than the number of rule strings \
         ({rules} rules, {operators} operators)"
    )]
    OperatorCount { rules: usize, operators: usize },

    #[error("invalid operator '{operator}'; only AND, OR, XOR, NAND, NOR, XNOR may combine rules")]
    InvalidConnective { operator: String },
}

/// Failures while walking an AST against a record.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("cannot convert '{value}' to a numeric value")]
    NotNumeric { value: String },

    #[error("division by zero is not allowed")]
    DivisionByZero,

    #[error("modulo by zero is not allowed")]
    ModuloByZero,

    #[error("unsupported operator '{operator}' encountered")]
    UnsupportedOperator { operator: BinOp },

    #[error("invalid tree structure: node {node} does not exist")]
    MissingNode { node: crate::NodeId },

    #[error("expression nesting exceeds the depth limit of {limit}")]
    DepthExceeded { limit: usize },
}

/// Failures reported by a [`RuleStore`](crate::RuleStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("rule not found: {0}")]
    RuleNotFound(RuleRef),

    #[error("a rule named '{name}' already exists")]
    DuplicateName { name: String },
}
