use super::{eval::evaluate, Clock, Dimensions, Error, SymbolTable};
use crate::mach::Operation;

type Result<T> = std::result::Result<T, Error>;

/// Every call name the scanner recognizes.
pub const VOCABULARY: [&str; 16] = [
    "setDrawColor",
    "drawPixel",
    "drawLine",
    "drawBox",
    "drawFrame",
    "drawCircle",
    "drawDisc",
    "drawStr",
    "setFont",
    "setCursor",
    "print",
    "println",
    "drawFastVLine",
    "drawFastHLine",
    "drawRect",
    "fillRect",
];

/// Best-effort lexical scan for drawing calls.
///
/// Each line is scanned on its own, so a call whose argument list continues
/// on the next line is not seen. Qualifiers in front of a call name
/// (`u8g2.`, `display->`, `ns::`) are ignored.
pub struct Extractor<'a> {
    symbols: &'a SymbolTable,
    dimensions: &'a Dimensions,
    clock: &'a dyn Clock,
}

impl<'a> Extractor<'a> {
    pub fn new(symbols: &'a SymbolTable, dimensions: &'a Dimensions, clock: &'a dyn Clock) -> Self {
        Extractor {
            symbols,
            dimensions,
            clock,
        }
    }

    pub fn extract(&self, lines: &[&str], diagnostics: &mut Vec<Error>) -> Vec<Operation> {
        let mut ops = vec![];
        for (index, line) in lines.iter().enumerate() {
            let line_number = Some(index + 1);
            for (name, args) in scan_calls(line) {
                let mut call = Call {
                    extractor: self,
                    name,
                    args: split_args(args),
                    diagnostics: vec![],
                };
                let result = call.operation();
                for e in call.diagnostics.drain(..) {
                    diagnostics.push(e.in_line_number(line_number));
                }
                match result {
                    Ok(op) => ops.push(op),
                    Err(e) => diagnostics.push(e.in_line_number(line_number)),
                }
            }
        }
        ops
    }
}

struct Call<'a, 'b> {
    extractor: &'b Extractor<'a>,
    name: &'b str,
    args: Vec<&'b str>,
    diagnostics: Vec<Error>,
}

impl<'a, 'b> Call<'a, 'b> {
    fn operation(&mut self) -> Result<Operation> {
        Ok(match self.name {
            "setDrawColor" => Operation::SetDrawColor { c: self.num(0)? },
            "drawPixel" => Operation::DrawPixel {
                x: self.num(0)?,
                y: self.num(1)?,
            },
            "drawLine" => Operation::DrawLine {
                x0: self.num(0)?,
                y0: self.num(1)?,
                x1: self.num(2)?,
                y1: self.num(3)?,
            },
            "drawBox" => Operation::DrawBox {
                x: self.num(0)?,
                y: self.num(1)?,
                w: self.num(2)?,
                h: self.num(3)?,
            },
            "drawFrame" => Operation::DrawFrame {
                x: self.num(0)?,
                y: self.num(1)?,
                w: self.num(2)?,
                h: self.num(3)?,
            },
            "drawCircle" => Operation::DrawCircle {
                x: self.num(0)?,
                y: self.num(1)?,
                r: self.num(2)?,
            },
            "drawDisc" => Operation::DrawDisc {
                x: self.num(0)?,
                y: self.num(1)?,
                r: self.num(2)?,
            },
            "drawStr" => {
                let (x, y) = (self.num(0)?, self.num(1)?);
                let text = self.args.get(2..).unwrap_or(&[]).join(",");
                Operation::DrawStr {
                    x,
                    y,
                    text: self.string(&text),
                }
            }
            "setFont" => {
                let name = self.arg(0)?;
                Operation::SetFont {
                    name: self.string(name),
                }
            }
            "setCursor" => Operation::SetCursor {
                x: self.num(0)?,
                y: self.num(1)?,
            },
            "print" => Operation::Print {
                text: self.string(&self.args.join(",")),
            },
            "println" => Operation::Println {
                text: self.string(&self.args.join(",")),
            },
            "drawFastVLine" => Operation::GfxVLine {
                x: self.num(0)?,
                y: self.num(1)?,
                h: self.num(2)?,
            },
            "drawFastHLine" => Operation::GfxHLine {
                x: self.num(0)?,
                y: self.num(1)?,
                w: self.num(2)?,
            },
            "drawRect" => Operation::GfxRect {
                x: self.num(0)?,
                y: self.num(1)?,
                w: self.num(2)?,
                h: self.num(3)?,
            },
            "fillRect" => Operation::GfxFillRect {
                x: self.num(0)?,
                y: self.num(1)?,
                w: self.num(2)?,
                h: self.num(3)?,
            },
            _ => return Err(error!(InternalError; &format!("UNKNOWN CALL {}", self.name))),
        })
    }

    fn arg(&self, index: usize) -> Result<&'b str> {
        match self.args.get(index) {
            Some(arg) => Ok(*arg),
            None => Err(error!(MissingArgument;
                &format!("{} ARGUMENT {}", self.name, index + 1))),
        }
    }

    /// Numeric arguments are truncated toward zero like a C `int`.
    fn num(&self, index: usize) -> Result<i32> {
        let expr = self.arg(index)?;
        let extractor = self.extractor;
        match evaluate(expr, extractor.symbols, extractor.dimensions) {
            Ok(value) if value.is_nan() => Err(error!(UnevaluableArgument;
                &format!("{} ARGUMENT {}: {}", self.name, index + 1, expr))),
            Ok(value) => Ok(value.trunc() as i32),
            Err(e) => Err(error!(UnevaluableArgument;
                &format!("{} ARGUMENT {}: {}", self.name, index + 1, e.detail()))),
        }
    }

    fn string(&mut self, expr: &str) -> String {
        let s = expr.trim();
        if let Some(literal) = quoted(s) {
            return literal.to_string();
        }
        if s.is_empty() {
            return String::new();
        }
        let extractor = self.extractor;
        if s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            match s {
                "PvTime" => return extractor.clock.time_string(),
                "PvDate" => return extractor.clock.date_string(),
                _ => {}
            }
        }
        match evaluate(s, extractor.symbols, extractor.dimensions) {
            Ok(value) if value.is_nan() => s.to_string(),
            Ok(value) => format_number(value),
            Err(e) => {
                self.diagnostics.push(e);
                s.to_string()
            }
        }
    }
}

fn quoted(s: &str) -> Option<&str> {
    let first = s.chars().next()?;
    if (first == '"' || first == '\'') && s.len() >= 2 && s.ends_with(first) {
        Some(&s[1..s.len() - 1])
    } else {
        None
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Finds every recognized call on a line, left to right. Yields the call
/// name and the raw text between its parentheses.
pub fn scan_calls(line: &str) -> Vec<(&'static str, &str)> {
    let mut calls = vec![];
    let mut pos = 0;
    while pos < line.len() {
        if !line.is_char_boundary(pos) {
            pos += 1;
            continue;
        }
        let rest = &line[pos..];
        let name = VOCABULARY
            .iter()
            .filter(|name| rest.starts_with(*name))
            .filter(|name| rest[name.len()..].trim_start().starts_with('('))
            .max_by_key(|name| name.len());
        if let Some(name) = name {
            let after = &rest[name.len()..];
            let open = pos + name.len() + (after.len() - after.trim_start().len());
            if let Some(close) = matching_paren(line, open) {
                calls.push((*name, &line[open + 1..close]));
                pos = close + 1;
                continue;
            }
        }
        pos += 1;
    }
    calls
}

/// Index of the `)` closing the `(` at `open`, ignoring parentheses inside
/// quoted strings.
fn matching_paren(line: &str, open: usize) -> Option<usize> {
    let mut depth = 0;
    let mut in_str: Option<char> = None;
    let mut prev = '\0';
    for (index, c) in line[open..].char_indices() {
        if let Some(quote) = in_str {
            if c == quote && prev != '\\' {
                in_str = None;
            }
        } else if c == '"' || c == '\'' {
            in_str = Some(c);
        } else if c == '(' {
            depth += 1;
        } else if c == ')' {
            depth -= 1;
            if depth == 0 {
                return Some(open + index);
            }
        }
        prev = c;
    }
    None
}

/// Splits an argument list on top-level commas. Commas nested in
/// parentheses or quoted strings stay inside their argument. A trailing
/// blank argument is dropped.
pub fn split_args(args: &str) -> Vec<&str> {
    let mut res = vec![];
    let mut start = 0;
    let mut depth = 0;
    let mut in_str: Option<char> = None;
    let mut prev = '\0';
    for (index, c) in args.char_indices() {
        if let Some(quote) = in_str {
            if c == quote && prev != '\\' {
                in_str = None;
            }
        } else if c == '"' || c == '\'' {
            in_str = Some(c);
        } else if c == '(' {
            depth += 1;
        } else if c == ')' {
            depth -= 1;
        } else if c == ',' && depth == 0 {
            res.push(args[start..index].trim());
            start = index + 1;
        }
        prev = c;
    }
    let last = args[start..].trim();
    if !last.is_empty() {
        res.push(last);
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_args() {
        assert_eq!(split_args(r#"0, 0, "a,b""#), vec!["0", "0", r#""a,b""#]);
        assert_eq!(split_args("f(1, 2), 3"), vec!["f(1, 2)", "3"]);
        assert_eq!(split_args(r#"'\'', ",""#), vec![r#"'\''"#, r#"",""#]);
        assert_eq!(split_args(r#""a\",b", 1"#), vec![r#""a\",b""#, "1"]);
        assert_eq!(split_args(""), Vec::<&str>::new());
        assert_eq!(split_args("1,"), vec!["1"]);
    }

    #[test]
    fn test_scan_calls() {
        let calls = scan_calls(r#"u8g2.drawBox(0, 0, display.width(), 8); u8g2.drawStr(2, 7, "(x)");"#);
        assert_eq!(
            calls,
            vec![
                ("drawBox", "0, 0, display.width(), 8"),
                ("drawStr", r#"2, 7, "(x)""#)
            ]
        );
    }

    #[test]
    fn test_scan_prefers_longest_name() {
        assert_eq!(scan_calls("display.println (x)"), vec![("println", "x")]);
        assert_eq!(scan_calls("Serial.print(1)"), vec![("print", "1")]);
    }

    #[test]
    fn test_scan_needs_closing_paren_on_line() {
        assert!(scan_calls("u8g2.drawLine(0, 0,").is_empty());
        assert!(scan_calls("drawPixel").is_empty());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(2.5), "2.5");
    }
}
