use super::{token::*, Dimensions};

pub fn lex(s: &str) -> Vec<Token> {
    ExprLexer::lex(s)
}

fn is_expr_whitespace(c: char) -> bool {
    c.is_whitespace()
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

trait Tokenizers<'a> {
    fn chars(&mut self) -> &mut std::iter::Peekable<std::str::Chars<'a>>;

    fn whitespace(&mut self) {
        while let Some(pk) = self.chars().peek() {
            if !is_expr_whitespace(*pk) {
                break;
            }
            self.chars().next();
        }
    }

    fn number(&mut self) -> Option<Token> {
        let mut s = String::new();
        while let Some(pk) = self.chars().peek() {
            if !pk.is_ascii_digit() && *pk != '.' {
                break;
            }
            s.push(*pk);
            self.chars().next();
        }
        match s.parse::<f64>() {
            Ok(n) => Some(Token::Number(n)),
            Err(_) => Some(Token::Unknown(s)),
        }
    }

    fn ident(&mut self) -> Option<Token> {
        let mut s = String::new();
        while let Some(pk) = self.chars().peek() {
            if !is_ident_continue(*pk) {
                break;
            }
            s.push(*pk);
            self.chars().next();
        }
        Some(Token::Ident(s))
    }

    fn minutia(&mut self) -> Option<Token> {
        let ch = self.chars().next()?;
        if let Some(op) = Operator::from_char(ch) {
            return Some(Token::Operator(op));
        }
        match ch {
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            '.' => Some(Token::Dot),
            _ => Some(Token::Unknown(ch.to_string())),
        }
    }
}

struct ExprLexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Tokenizers<'a> for ExprLexer<'a> {
    fn chars(&mut self) -> &mut std::iter::Peekable<std::str::Chars<'a>> {
        &mut self.chars
    }
}

impl<'a> Iterator for ExprLexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let mut pk = *self.chars.peek()?;
        if is_expr_whitespace(pk) {
            self.whitespace();
            pk = *self.chars.peek()?;
        }
        if pk.is_ascii_digit() {
            return self.number();
        }
        if is_ident_start(pk) {
            return self.ident();
        }
        self.minutia()
    }
}

impl<'a> ExprLexer<'a> {
    fn lex(s: &str) -> Vec<Token> {
        ExprLexer {
            chars: s.chars().peekable(),
        }
        .collect()
    }
}

/// Replaces `display.width()` and `display.height()` with the canvas size.
pub fn collapse_accessors(tokens: &mut Vec<Token>, dimensions: &Dimensions) {
    let mut locs: Vec<(usize, Token)> = vec![];
    let mut windows = tokens.windows(5).enumerate();
    while let Some((index, w)) = windows.next() {
        let object = matches!(&w[0], Token::Ident(s) if s == "display");
        if !object || w[1] != Token::Dot || w[3] != Token::LParen || w[4] != Token::RParen {
            continue;
        }
        let value = match &w[2] {
            Token::Ident(s) if s == "width" => dimensions.width,
            Token::Ident(s) if s == "height" => dimensions.height,
            _ => continue,
        };
        locs.push((index, Token::Number(value as f64)));
        for _ in 0..4 {
            windows.next();
        }
    }
    while let Some((index, token)) = locs.pop() {
        tokens.splice(index..index + 5, Some(token));
    }
}
