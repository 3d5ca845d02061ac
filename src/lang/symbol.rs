use super::{eval::evaluate, Dimensions, Error};
use std::collections::HashMap;

/// Scalar bindings visible to expressions in one compile call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    symbols: HashMap<String, f64>,
}

impl SymbolTable {
    /// A table holding only the canvas size.
    pub fn new(dimensions: &Dimensions) -> SymbolTable {
        let mut table = SymbolTable::default();
        table.insert("WIDTH", dimensions.width as f64);
        table.insert("HEIGHT", dimensions.height as f64);
        table.insert("width", dimensions.width as f64);
        table.insert("height", dimensions.height as f64);
        table
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.symbols.get(name).copied()
    }

    pub fn insert(&mut self, name: &str, value: f64) {
        self.symbols.insert(name.to_string(), value);
    }

    /// First pass: object-like `#define NAME EXPR` lines, in source order.
    /// Returns how many were bound.
    pub fn define_macros(
        &mut self,
        lines: &[&str],
        dimensions: &Dimensions,
        diagnostics: &mut Vec<Error>,
    ) -> usize {
        self.define(lines, match_define, false, dimensions, diagnostics)
    }

    /// Second pass: `[const] [type] NAME = EXPR;` lines. Runs after every
    /// macro is known; a constant only sees constants declared above it.
    /// A constant that comes out as NaN is still bound and counted, and
    /// reported.
    pub fn define_constants(
        &mut self,
        lines: &[&str],
        dimensions: &Dimensions,
        diagnostics: &mut Vec<Error>,
    ) -> usize {
        self.define(lines, match_assignment, true, dimensions, diagnostics)
    }

    fn define(
        &mut self,
        lines: &[&str],
        matcher: fn(&str) -> Option<(&str, &str)>,
        report_nan: bool,
        dimensions: &Dimensions,
        diagnostics: &mut Vec<Error>,
    ) -> usize {
        let mut count = 0;
        for (index, line) in lines.iter().enumerate() {
            if let Some((name, expr)) = matcher(line) {
                match evaluate(expr, self, dimensions) {
                    Ok(value) => {
                        if report_nan && value.is_nan() {
                            let message = format!("{} = {}", name, expr.trim());
                            diagnostics.push(error!(UndefinedValue, Some(index + 1); &message));
                        }
                        self.insert(name, value);
                        count += 1;
                    }
                    Err(e) => diagnostics.push(e.in_line_number(Some(index + 1))),
                }
            }
        }
        count
    }
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn split_ident(s: &str) -> Option<(&str, &str)> {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return None,
    }
    let end = s.find(|c: char| !is_word(c)).unwrap_or_else(|| s.len());
    Some((&s[..end], &s[end..]))
}

fn is_macro_char(c: char) -> bool {
    is_word(c) || "-+*/()%. ".contains(c)
}

/// Matches `#define NAME EXPR`, where EXPR is the run of arithmetic
/// characters after the name. A trailing line comment is not part of EXPR.
fn match_define(line: &str) -> Option<(&str, &str)> {
    let s = line.trim_start().strip_prefix('#')?.trim_start();
    let s = s.strip_prefix("define")?;
    let rest = s.trim_start();
    if rest.len() == s.len() {
        return None;
    }
    let (name, after) = split_ident(rest)?;
    let body = after.trim_start();
    if body.len() == after.len() {
        return None;
    }
    let end = body.find(|c: char| !is_macro_char(c)).unwrap_or_else(|| body.len());
    let mut expr = &body[..end];
    if let Some(comment) = expr.find("//").or_else(|| expr.find("/*")) {
        expr = &expr[..comment];
    }
    if expr.trim().is_empty() {
        return None;
    }
    Some((name, expr))
}

/// Matches the first `NAME = EXPR;` on the line. Storage and type keywords
/// in front of the name are skipped like any other word; `==` never matches.
fn match_assignment(line: &str) -> Option<(&str, &str)> {
    let mut prev: Option<char> = None;
    for (index, c) in line.char_indices() {
        let at_word_start = !prev.map_or(false, is_word);
        prev = Some(c);
        if !at_word_start {
            continue;
        }
        let (name, after) = match split_ident(&line[index..]) {
            Some(split) => split,
            None => continue,
        };
        let after = after.trim_start();
        let rest = match after.strip_prefix('=') {
            Some(rest) if !rest.starts_with('=') => rest,
            _ => continue,
        };
        let semi = match rest.find(';') {
            Some(semi) => semi,
            None => continue,
        };
        if semi == 0 {
            continue;
        }
        return Some((name, rest[..semi].trim_start()));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_define() {
        assert_eq!(match_define("#define W 128"), Some(("W", "128")));
        assert_eq!(match_define("  # define  MID (W/2)  "), Some(("MID", "(W/2)  ")));
        assert_eq!(match_define("#define X 10 // pixels"), Some(("X", "10 ")));
        assert_eq!(match_define("#define F(x) x"), None);
        assert_eq!(match_define("#define FLAG"), None);
        assert_eq!(match_define("#define NAME \"text\""), None);
        assert_eq!(match_define("#include <U8g2lib.h>"), None);
    }

    #[test]
    fn test_match_assignment() {
        assert_eq!(match_assignment("const int M = N*2;"), Some(("M", "N*2")));
        assert_eq!(match_assignment("constexpr auto y=3 ; // c"), Some(("y", "3 ")));
        assert_eq!(match_assignment("p.x = 4;"), Some(("x", "4")));
        assert_eq!(match_assignment("if (a == b);"), None);
        assert_eq!(match_assignment("x += 1;"), None);
        assert_eq!(match_assignment("int x = 5"), None);
        assert_eq!(match_assignment("u8g2.drawBox(0, 0, 4, 4);"), None);
    }

    #[test]
    fn test_same_phase_overwrites() {
        let dimensions = Dimensions {
            width: 128,
            height: 64,
        };
        let mut table = SymbolTable::new(&dimensions);
        let mut diagnostics = vec![];
        let lines = ["#define A 1", "#define A (A+1)"];
        assert_eq!(table.define_macros(&lines, &dimensions, &mut diagnostics), 2);
        assert_eq!(table.get("A"), Some(2.0));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_nan_constant_is_bound_and_reported() {
        let dimensions = Dimensions::default();
        let mut table = SymbolTable::new(&dimensions);
        let mut diagnostics = vec![];
        let lines = ["int B = C * 2;", "int C = 3;", "#define D E"];
        assert_eq!(table.define_constants(&lines, &dimensions, &mut diagnostics), 2);
        assert!(table.get("B").map_or(false, f64::is_nan));
        assert_eq!(table.get("C"), Some(3.0));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].to_string(), "UNDEFINED VALUE IN 1; B = C * 2");
        diagnostics.clear();
        assert_eq!(table.define_macros(&lines, &dimensions, &mut diagnostics), 1);
        assert!(diagnostics.is_empty());
    }
}
