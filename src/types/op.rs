use std::fmt;
use std::str::FromStr;

/// Every binary operator symbol a rule string may contain.
///
/// All operators are binary and left-associative. Precedence follows the
/// table below (higher binds tighter):
///
/// | Operators                         | Precedence |
/// |-----------------------------------|------------|
/// | `AND` `OR` `XOR`                  | 1          |
/// | `NAND` `NOR` `XNOR`               | 2          |
/// | `>` `>=` `<` `<=` `=` `==` `!=`   | 3          |
/// | `+` `-`                           | 4          |
/// | `*` `/` `%`                       | 5          |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "binary-cache", derive(serde::Serialize, serde::Deserialize))]
pub enum BinOp {
    And,
    Or,
    Xor,
    Nand,
    Nor,
    Xnor,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Single `=`.
    Assign,
    /// Double `==`. Evaluates exactly like [`BinOp::Assign`].
    Eq,
    Neq,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinOp {
    pub const ALL: [BinOp; 18] = [
        BinOp::And,
        BinOp::Or,
        BinOp::Xor,
        BinOp::Nand,
        BinOp::Nor,
        BinOp::Xnor,
        BinOp::Gt,
        BinOp::Gte,
        BinOp::Lt,
        BinOp::Lte,
        BinOp::Assign,
        BinOp::Eq,
        BinOp::Neq,
        BinOp::Add,
        BinOp::Sub,
        BinOp::Mul,
        BinOp::Div,
        BinOp::Rem,
    ];

    /// The source text of this operator.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::And => "AND",
            BinOp::Or => "OR",
            BinOp::Xor => "XOR",
            BinOp::Nand => "NAND",
            BinOp::Nor => "NOR",
            BinOp::Xnor => "XNOR",
            BinOp::Gt => ">",
            BinOp::Gte => ">=",
            BinOp::Lt => "<",
            BinOp::Lte => "<=",
            BinOp::Assign => "=",
            BinOp::Eq => "==",
            BinOp::Neq => "!=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
        }
    }

    #[must_use]
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::And | BinOp::Or | BinOp::Xor => 1,
            BinOp::Nand | BinOp::Nor | BinOp::Xnor => 2,
            BinOp::Gt
            | BinOp::Gte
            | BinOp::Lt
            | BinOp::Lte
            | BinOp::Assign
            | BinOp::Eq
            | BinOp::Neq => 3,
            BinOp::Add | BinOp::Sub => 4,
            BinOp::Mul | BinOp::Div | BinOp::Rem => 5,
        }
    }

    /// Whether this operator may join two sub-rules in
    /// [`RuleEngine::combine`](crate::RuleEngine::combine).
    #[must_use]
    pub fn is_connective(self) -> bool {
        matches!(
            self,
            BinOp::And | BinOp::Or | BinOp::Xor | BinOp::Nand | BinOp::Nor | BinOp::Xnor
        )
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Returned when a string is not one of the operator symbols.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown operator '{0}'")]
pub struct UnknownOperator(pub String);

impl FromStr for BinOp {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BinOp::ALL
            .into_iter()
            .find(|op| op.symbol() == s)
            .ok_or_else(|| UnknownOperator(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_round_trip_through_from_str() {
        for op in BinOp::ALL {
            assert_eq!(op.symbol().parse::<BinOp>(), Ok(op));
        }
    }

    #[test]
    fn from_str_is_case_sensitive() {
        assert!("and".parse::<BinOp>().is_err());
        assert_eq!(
            "=>".parse::<BinOp>(),
            Err(UnknownOperator("=>".to_owned()))
        );
    }

    #[test]
    fn precedence_table() {
        assert!(BinOp::Mul.precedence() > BinOp::Add.precedence());
        assert!(BinOp::Add.precedence() > BinOp::Gt.precedence());
        assert!(BinOp::Gt.precedence() > BinOp::Nand.precedence());
        assert!(BinOp::Nand.precedence() > BinOp::And.precedence());
        assert_eq!(BinOp::And.precedence(), BinOp::Or.precedence());
        assert_eq!(BinOp::Eq.precedence(), BinOp::Assign.precedence());
    }

    #[test]
    fn connectives() {
        let connectives: Vec<BinOp> = BinOp::ALL
            .into_iter()
            .filter(|op| op.is_connective())
            .collect();
        assert_eq!(
            connectives,
            vec![
                BinOp::And,
                BinOp::Or,
                BinOp::Xor,
                BinOp::Nand,
                BinOp::Nor,
                BinOp::Xnor
            ]
        );
    }
}
