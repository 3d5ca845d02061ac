use super::lex::{collapse_accessors, lex};
use super::rpn::to_rpn;
use super::{token::Token, Dimensions, Error, Stack, SymbolTable};

type Result<T> = std::result::Result<T, Error>;

/// Evaluates an arithmetic expression against a symbol table.
///
/// An identifier missing from the table is not an error; it evaluates to
/// NaN and the NaN propagates. Only a token stream that cannot be evaluated
/// at all (stray characters, unbalanced parentheses, missing or extra
/// operands, nothing to evaluate) produces an `Err`.
pub fn evaluate(expr: &str, symbols: &SymbolTable, dimensions: &Dimensions) -> Result<f64> {
    let malformed = |e: Error| {
        error!(MalformedExpression; &format!("{} -> {}", expr.trim(), e.detail()))
    };
    let mut tokens = lex(expr);
    collapse_accessors(&mut tokens, dimensions);
    if tokens.is_empty() {
        return Err(malformed(error!(MalformedExpression; "EMPTY EXPRESSION")));
    }
    let rpn = to_rpn(&tokens).map_err(malformed)?;
    evaluate_rpn(&rpn, symbols).map_err(malformed)
}

fn evaluate_rpn(rpn: &[Token], symbols: &SymbolTable) -> Result<f64> {
    let mut stack: Stack<f64> = Stack::new("EXPRESSION TOO COMPLEX");
    for token in rpn {
        match token {
            Token::Number(n) => stack.push(*n)?,
            Token::Ident(name) => stack.push(symbols.get(name).unwrap_or(f64::NAN))?,
            Token::Operator(op) => {
                let (lhs, rhs) = stack.pop_2()?;
                stack.push(op.apply(lhs, rhs))?;
            }
            _ => return Err(error!(InternalError; "UNEXPECTED TOKEN IN RPN")),
        }
    }
    let value = stack.pop()?;
    if !stack.is_empty() {
        return Err(error!(MalformedExpression; "EXTRA OPERAND"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIMENSIONS: Dimensions = Dimensions {
        width: 128,
        height: 64,
    };

    fn eval(s: &str) -> Result<f64> {
        evaluate(s, &SymbolTable::new(&DIMENSIONS), &DIMENSIONS)
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("2+3*4").unwrap(), 14.0);
        assert_eq!(eval("(2+3)*4").unwrap(), 20.0);
        assert_eq!(eval("10-4-3").unwrap(), 3.0);
    }

    #[test]
    fn test_seeded_size() {
        assert_eq!(eval("WIDTH/2").unwrap(), 64.0);
        assert_eq!(eval("display.height() - 1").unwrap(), 63.0);
    }

    #[test]
    fn test_unresolved_is_nan_not_error() {
        assert!(eval("FOO+1").unwrap().is_nan());
    }

    #[test]
    fn test_malformed() {
        assert!(eval("").is_err());
        assert!(eval("2 3").is_err());
        assert!(eval("-5").is_err());
        assert!(eval("7 % 2").is_err());
        let err = eval("(1+").unwrap_err();
        assert_eq!(
            err.to_string(),
            "MALFORMED EXPRESSION; (1+ -> UNMATCHED LEFT PARENTHESIS"
        );
    }
}
