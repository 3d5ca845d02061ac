/*!
# Rust Language Module

This Rust module turns firmware source into drawing operations: a small
expression evaluator, the macro and constant symbol table, and the
line-by-line scan for drawing calls.

*/

#[macro_use]
mod error;
mod clock;
mod compile;
mod eval;
mod extract;
mod lex;
mod rpn;
mod stack;
mod symbol;
mod token;

pub use clock::{Clock, FixedClock, SystemClock};
pub use compile::{compile, CompileResult, Stats};
pub use error::Error;
pub use error::ErrorCode;
pub use eval::evaluate;
pub use extract::{scan_calls, split_args, Extractor, VOCABULARY};
pub use lex::lex;
pub use stack::Stack;
pub use symbol::SymbolTable;
pub use token::{Operator, Token};

/// 1-based source line a diagnostic refers to, when it refers to one.
pub type LineNumber = Option<usize>;

/// Canvas size in display pixels, before scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Default for Dimensions {
    fn default() -> Self {
        Dimensions {
            width: 128,
            height: 64,
        }
    }
}
