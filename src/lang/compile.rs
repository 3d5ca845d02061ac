use super::{Clock, Dimensions, Error, Extractor, SymbolTable};
use crate::mach::Operation;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub lines: usize,
    pub defines: usize,
    pub consts: usize,
}

/// Everything one compile call produces. Diagnostics never change the
/// shape of the result; a source that is nothing but errors still compiles
/// to an (empty) operation list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompileResult {
    #[serde(rename = "ops")]
    pub operations: Vec<Operation>,
    pub stats: Stats,
    #[serde(rename = "errors")]
    pub diagnostics: Vec<Error>,
}

pub fn compile(source: &str, dimensions: &Dimensions, clock: &dyn Clock) -> CompileResult {
    CompileContext::new(dimensions, clock).compile(source)
}

/// Request-scoped state for one compile call.
struct CompileContext<'a> {
    dimensions: &'a Dimensions,
    clock: &'a dyn Clock,
    symbols: SymbolTable,
    diagnostics: Vec<Error>,
}

impl<'a> CompileContext<'a> {
    fn new(dimensions: &'a Dimensions, clock: &'a dyn Clock) -> CompileContext<'a> {
        CompileContext {
            dimensions,
            clock,
            symbols: SymbolTable::new(dimensions),
            diagnostics: vec![],
        }
    }

    fn compile(mut self, source: &str) -> CompileResult {
        let lines: Vec<&str> = source
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();
        let defines = self
            .symbols
            .define_macros(&lines, self.dimensions, &mut self.diagnostics);
        let consts = self
            .symbols
            .define_constants(&lines, self.dimensions, &mut self.diagnostics);
        let operations = Extractor::new(&self.symbols, self.dimensions, self.clock)
            .extract(&lines, &mut self.diagnostics);
        CompileResult {
            operations,
            stats: Stats {
                lines: lines.len(),
                defines,
                consts,
            },
            diagnostics: self.diagnostics,
        }
    }
}
