use std::collections::HashMap;

use crate::{Ast, BinOp, EngineConfig, EvalError, Node, NodeId, NodeSource, Record, Verdict};

/// Evaluate the graph below `root` against `record`.
///
/// Logical connectives short-circuit: `AND` skips its right side once the
/// left is false, `OR` once the left is true. Every other operator evaluates
/// both sides and yields [`Verdict::Unknown`] if either is unknown.
///
/// # Errors
///
/// Returns [`EvalError`] on numeric coercion failure, division or modulo by
/// zero, an operator without evaluation semantics (`NAND`, `NOR`, `XNOR`),
/// a dangling handle, or nesting deeper than `max_depth`.
pub fn evaluate<S: NodeSource + ?Sized>(
    source: &S,
    root: NodeId,
    record: &Record,
    max_depth: usize,
) -> Result<Verdict, EvalError> {
    Evaluator {
        source,
        record,
        max_depth,
    }
    .eval(root, 0)
}

/// Fail if the graph below `root` nests deeper than `max_depth`, without
/// evaluating anything.
pub(crate) fn check_depth<S: NodeSource + ?Sized>(
    source: &S,
    root: NodeId,
    max_depth: usize,
) -> Result<(), EvalError> {
    fn walk<S: NodeSource + ?Sized>(
        source: &S,
        id: NodeId,
        depth: usize,
        max_depth: usize,
        seen: &mut HashMap<NodeId, usize>,
    ) -> Result<(), EvalError> {
        if depth > max_depth {
            return Err(EvalError::DepthExceeded { limit: max_depth });
        }
        // shared nodes only need a second look when reached deeper
        if seen.get(&id).is_some_and(|&at| at <= depth) {
            return Ok(());
        }
        if let Some((left, right)) = source.node(id).and_then(Node::children) {
            walk(source, left, depth + 1, max_depth, seen)?;
            walk(source, right, depth + 1, max_depth, seen)?;
        }
        seen.insert(id, depth);
        Ok(())
    }

    walk(source, root, 0, max_depth, &mut HashMap::new())
}

impl Ast {
    /// Evaluate this AST from its root with the default depth limit.
    ///
    /// # Errors
    ///
    /// See [`evaluate`].
    pub fn evaluate(&self, record: &Record) -> Result<Verdict, EvalError> {
        evaluate(self, self.root, record, EngineConfig::DEFAULT_MAX_DEPTH)
    }
}

struct Evaluator<'a, S: ?Sized> {
    source: &'a S,
    record: &'a Record,
    max_depth: usize,
}

impl<S: NodeSource + ?Sized> Evaluator<'_, S> {
    fn eval(&self, id: NodeId, depth: usize) -> Result<Verdict, EvalError> {
        if depth > self.max_depth {
            return Err(EvalError::DepthExceeded {
                limit: self.max_depth,
            });
        }
        match self.source.node(id) {
            Some(Node::Literal(value)) => Ok(Verdict::Text(value.clone())),
            Some(Node::Variable(name)) => Ok(self
                .record
                .get(name)
                .map_or(Verdict::Unknown, |value| Verdict::Text(value.to_owned()))),
            Some(Node::Operator { op, left, right }) => self.apply(*op, *left, *right, depth + 1),
            None => Err(EvalError::MissingNode { node: id }),
        }
    }

    fn apply(
        &self,
        op: BinOp,
        left: NodeId,
        right: NodeId,
        depth: usize,
    ) -> Result<Verdict, EvalError> {
        match op {
            BinOp::And => {
                let Some(lhs) = self.eval(left, depth)?.truthiness() else {
                    return Ok(Verdict::Unknown);
                };
                if !lhs {
                    return Ok(Verdict::Bool(false));
                }
                Ok(truth(&self.eval(right, depth)?))
            }
            BinOp::Or => {
                let Some(lhs) = self.eval(left, depth)?.truthiness() else {
                    return Ok(Verdict::Unknown);
                };
                if lhs {
                    return Ok(Verdict::Bool(true));
                }
                Ok(truth(&self.eval(right, depth)?))
            }
            BinOp::Xor => {
                let lhs = self.eval(left, depth)?;
                let rhs = self.eval(right, depth)?;
                Ok(match (lhs.truthiness(), rhs.truthiness()) {
                    (Some(a), Some(b)) => Verdict::Bool(a != b),
                    _ => Verdict::Unknown,
                })
            }
            _ => {
                let lhs = self.eval(left, depth)?;
                let rhs = self.eval(right, depth)?;
                if lhs.is_unknown() || rhs.is_unknown() {
                    return Ok(Verdict::Unknown);
                }
                binary(op, &lhs, &rhs)
            }
        }
    }
}

fn truth(value: &Verdict) -> Verdict {
    value.truthiness().map_or(Verdict::Unknown, Verdict::Bool)
}

fn number(value: &Verdict) -> Result<f64, EvalError> {
    value.as_number().ok_or_else(|| EvalError::NotNumeric {
        value: match value {
            Verdict::Text(text) => text.clone(),
            other => other.to_string(),
        },
    })
}

/// Comparison and arithmetic on two known operands.
fn binary(op: BinOp, lhs: &Verdict, rhs: &Verdict) -> Result<Verdict, EvalError> {
    let verdict = match op {
        BinOp::Gt => Verdict::Bool(number(lhs)? > number(rhs)?),
        BinOp::Gte => Verdict::Bool(number(lhs)? >= number(rhs)?),
        BinOp::Lt => Verdict::Bool(number(lhs)? < number(rhs)?),
        BinOp::Lte => Verdict::Bool(number(lhs)? <= number(rhs)?),
        BinOp::Assign | BinOp::Eq => Verdict::Bool(lhs.loosely_equals(rhs)),
        BinOp::Neq => Verdict::Bool(!lhs.loosely_equals(rhs)),
        BinOp::Add => Verdict::Number(number(lhs)? + number(rhs)?),
        BinOp::Sub => Verdict::Number(number(lhs)? - number(rhs)?),
        BinOp::Mul => Verdict::Number(number(lhs)? * number(rhs)?),
        BinOp::Div => {
            let divisor = number(rhs)?;
            if divisor == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            Verdict::Number(number(lhs)? / divisor)
        }
        BinOp::Rem => {
            let divisor = number(rhs)?;
            if divisor == 0.0 {
                return Err(EvalError::ModuloByZero);
            }
            Verdict::Number(floored_rem(number(lhs)?, divisor))
        }
        // NAND, NOR and XNOR tokenize and parse but have no evaluation rule
        BinOp::And | BinOp::Or | BinOp::Xor | BinOp::Nand | BinOp::Nor | BinOp::Xnor => {
            return Err(EvalError::UnsupportedOperator { operator: op });
        }
    };
    Ok(verdict)
}

/// Remainder that takes the sign of the divisor.
fn floored_rem(a: f64, b: f64) -> f64 {
    let r = a % b;
    if r != 0.0 && (r < 0.0) != (b < 0.0) {
        r + b
    } else {
        r
    }
}
