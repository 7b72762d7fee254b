//! The actual passes that compile / transform from one data structure
//! to the next.
//!
//! The compilation process goes in this order:
//!
//! 1. [scan]
//! 2. [parse]
//! 3. [generate]
//! 4. [optimize]
//!
//! Also bundled here (because there's not a great way to put them elsewhere)
//! are the error types for scan + parse. scan collects every error and keeps
//! going, parse stops at the first one, and generate + optimize never fail

mod codegen;
mod filter;
mod lexer;
mod optimizer;
mod parser;

pub use codegen::generate;
pub use filter::{compile_filter, shift_terms, ShiftTerm};
pub use lexer::{scan, LexError, LexErrorKind};
pub use optimizer::{optimize, AliasElimination, Substring};
pub use parser::{parse, Expectation, ParseError};
