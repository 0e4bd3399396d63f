//! Mini-C Compiler Front End
//!
//! The front end of a compiler for a small statically-typed, C-like
//! procedural language with four scalar types (`int`, `float`, `bool`,
//! `void`), functions, externs, and structured control flow.
//!
//! # Architecture
//!
//! ```text
//! Source Code (.mc)
//!       │
//!       ▼
//! ┌─────────────┐
//! │    Lexer    │  → Tokens
//! └─────────────┘
//!       │
//!       ▼
//! ┌─────────────┐
//! │   Parser    │  → AST
//! └─────────────┘
//!       │
//!       ▼
//! ┌─────────────┐
//! │   Lowering  │  → emitter calls (basic blocks, stack slots, ops)
//! └─────────────┘
//! ```
//!
//! Symbol resolution and type coercion run interleaved with lowering;
//! the lowerer drives any backend implementing [`ir::Emitter`]. The
//! in-crate [`ir::IrBuilder`] backend materializes an [`ir::Module`]
//! that the CLI prints as textual IR.

pub mod ast;
pub mod ir;
pub mod lexer;
pub mod parser;
pub mod sema;
pub mod span;
pub mod token;
pub mod ty;

// Re-exports for convenience
pub use lexer::Lexer;
pub use span::{Position, Span};
pub use token::{Token, TokenKind};

use sema::Warning;
use thiserror::Error;

/// Compiler version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// File extension for mini-C source files
pub const FILE_EXTENSION: &str = "mc";

/// A fatal compilation error from any phase.
#[derive(Error, Debug, Clone)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] parser::ParseError),

    #[error(transparent)]
    Sema(#[from] sema::SemaError),
}

/// Compile one translation unit into an IR module.
///
/// Runs the whole pipeline against the in-crate [`ir::IrBuilder`]
/// backend. Warnings are returned in arrival order so the caller can
/// flush them after compilation completes.
pub fn compile(
    source: &str,
    module_name: &str,
) -> Result<(ir::Module, Vec<Warning>), CompileError> {
    let program = parser::parse(source)?;
    let lowerer = ir::Lowerer::new(source, ir::IrBuilder::new(module_name));
    let (builder, warnings) = lowerer.lower_program(&program)?;
    Ok((builder.finish(), warnings))
}
