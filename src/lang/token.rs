#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    Unknown(String),
    Number(f64),
    Ident(String),
    Operator(Operator),
    LParen,
    RParen,
    Dot,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Token::*;
        match self {
            Unknown(s) => write!(f, "{}", s),
            Number(n) => write!(f, "{}", n),
            Ident(s) => write!(f, "{}", s),
            Operator(s) => write!(f, "{}", s),
            LParen => write!(f, "("),
            RParen => write!(f, ")"),
            Dot => write!(f, "."),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Operator {
    Plus,
    Minus,
    Multiply,
    Divide,
}

impl Operator {
    pub fn from_char(c: char) -> Option<Operator> {
        match c {
            '+' => Some(Operator::Plus),
            '-' => Some(Operator::Minus),
            '*' => Some(Operator::Multiply),
            '/' => Some(Operator::Divide),
            _ => None,
        }
    }

    pub fn precedence(&self) -> usize {
        use Operator::*;
        match self {
            Plus | Minus => 10,
            Multiply | Divide => 20,
        }
    }

    /// Division by zero is NaN rather than infinity.
    pub fn apply(&self, lhs: f64, rhs: f64) -> f64 {
        use Operator::*;
        match self {
            Plus => lhs + rhs,
            Minus => lhs - rhs,
            Multiply => lhs * rhs,
            Divide => {
                if rhs == 0.0 {
                    f64::NAN
                } else {
                    lhs / rhs
                }
            }
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Operator::*;
        match self {
            Plus => write!(f, "+"),
            Minus => write!(f, "-"),
            Multiply => write!(f, "*"),
            Divide => write!(f, "/"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_char() {
        assert_eq!(Operator::from_char('*'), Some(Operator::Multiply));
        assert_eq!(Operator::from_char('%'), None);
    }

    #[test]
    fn test_divide_by_zero() {
        assert!(Operator::Divide.apply(128.0, 0.0).is_nan());
        assert_eq!(Operator::Divide.apply(128.0, 4.0), 32.0);
    }
}
