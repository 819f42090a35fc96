mod error;
mod node;
mod op;
mod record;
mod rule;
mod verdict;

pub use error::{CompileError, EvalError, StoreError};
pub use node::{Ast, Node, NodeDisplay, NodeId, NodeSource};
pub use op::{BinOp, UnknownOperator};
pub use record::{Record, RecordValue};
pub use rule::{Rule, RuleId, RuleRef};
pub use verdict::Verdict;
