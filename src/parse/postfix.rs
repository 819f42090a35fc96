use super::{ParseError, Token};

/// Reorder an infix token stream into postfix (reverse Polish) order using
/// the shunting-yard algorithm and [`BinOp::precedence`](crate::BinOp::precedence).
///
/// All operators are left-associative: an incoming operator first pops
/// every stacked operator of equal or higher precedence.
///
/// # Errors
///
/// Returns [`ParseError::EmptyInput`] when there are no tokens, and a
/// parenthesis error when `(` and `)` do not balance.
pub fn to_postfix<'a>(
    tokens: impl IntoIterator<Item = Token<'a>>,
) -> Result<Vec<Token<'a>>, ParseError> {
    let mut output = Vec::new();
    let mut stack: Vec<Token<'a>> = Vec::new();
    let mut seen_any = false;

    for token in tokens {
        seen_any = true;
        match token {
            Token::Operand(_) => output.push(token),
            Token::LParen => stack.push(token),
            Token::RParen => loop {
                match stack.pop() {
                    Some(Token::LParen) => break,
                    Some(op) => output.push(op),
                    None => return Err(ParseError::ExtraClosingParen),
                }
            },
            Token::Op(op) => {
                while let Some(&Token::Op(top)) = stack.last() {
                    if top.precedence() < op.precedence() {
                        break;
                    }
                    output.push(Token::Op(top));
                    stack.pop();
                }
                stack.push(token);
            }
        }
    }

    if !seen_any {
        return Err(ParseError::EmptyInput);
    }

    while let Some(token) = stack.pop() {
        if token == Token::LParen {
            return Err(ParseError::UnmatchedOpeningParen);
        }
        output.push(token);
    }

    tracing::trace!(tokens = output.len(), "converted to postfix");
    Ok(output)
}
