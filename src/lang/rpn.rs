use super::{token::*, Error, Stack};

type Result<T> = std::result::Result<T, Error>;

/// Shunting-yard conversion of an infix token stream to reverse Polish.
/// Both operator tiers are left associative.
pub fn to_rpn(tokens: &[Token]) -> Result<Vec<Token>> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut ops: Stack<Token> = Stack::new("EXPRESSION TOO COMPLEX");
    for token in tokens {
        match token {
            Token::Number(_) | Token::Ident(_) => out.push(token.clone()),
            Token::Operator(op) => {
                while let Some(Token::Operator(top)) = ops.last() {
                    if top.precedence() < op.precedence() {
                        break;
                    }
                    out.push(ops.pop()?);
                }
                ops.push(token.clone())?;
            }
            Token::LParen => ops.push(Token::LParen)?,
            Token::RParen => loop {
                match ops.pop() {
                    Ok(Token::LParen) => break,
                    Ok(t) => out.push(t),
                    Err(_) => return Err(error!(MalformedExpression; "UNMATCHED RIGHT PARENTHESIS")),
                }
            },
            Token::Unknown(_) | Token::Dot => {
                return Err(error!(MalformedExpression; &format!("UNEXPECTED {}", token)))
            }
        }
    }
    for token in ops.into_vec().into_iter().rev() {
        if token == Token::LParen {
            return Err(error!(MalformedExpression; "UNMATCHED LEFT PARENTHESIS"));
        }
        out.push(token);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::super::lex::lex;
    use super::*;

    fn rpn_str(s: &str) -> String {
        let rpn = to_rpn(&lex(s)).unwrap();
        rpn.iter()
            .map(|t| t.to_string())
            .collect::<Vec<String>>()
            .join(" ")
    }

    #[test]
    fn test_precedence() {
        assert_eq!(rpn_str("2+3*4"), "2 3 4 * +");
        assert_eq!(rpn_str("(2+3)*4"), "2 3 + 4 *");
    }

    #[test]
    fn test_left_assoc() {
        assert_eq!(rpn_str("8-2-1"), "8 2 - 1 -");
        assert_eq!(rpn_str("W/2*3"), "W 2 / 3 *");
    }

    #[test]
    fn test_unbalanced() {
        assert!(to_rpn(&lex("(1+2")).is_err());
        assert!(to_rpn(&lex("1+2)")).is_err());
    }
}
