//! Compile infix rule strings such as `age > 30 AND department = 'Sales'`
//! into a deduplicated node graph, and evaluate them against flat records
//! with three-valued logic.
//!
//! The pipeline is tokenizer ([`parse::tokenize`]) → shunting-yard
//! ([`parse::to_postfix`]) → graph builder ([`AstBuilder`]) → evaluator
//! ([`evaluate()`]). [`RuleEngine`] wires these to a [`RuleStore`] and is
//! the usual entry point.

mod compile;
mod config;
mod engine;
mod error;
mod evaluate;
pub mod parse;
#[cfg(feature = "binary-cache")]
mod serial;
mod store;
mod types;

pub use compile::{build_ast, combine_sources, compile_source, AstBuilder, CompiledSource};
pub use config::{EngineConfig, Lexing};
pub use engine::RuleEngine;
pub use error::{ErrorKind, RuleitError};
pub use evaluate::evaluate;
#[cfg(feature = "binary-cache")]
pub use serial::{DeserializeError, SerializeError};
pub use store::{MemoryStore, Page, RuleStore};
pub use types::{
    Ast, BinOp, CompileError, EvalError, Node, NodeDisplay, NodeId, NodeSource, Record,
    RecordValue, Rule, RuleId, RuleRef, StoreError, UnknownOperator, Verdict,
};
