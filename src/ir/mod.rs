//! Mini-C Intermediate Representation
//!
//! A small block-structured IR. Lowering drives any [`Emitter`]
//! backend; [`IrBuilder`] is the in-crate one and materializes a
//! [`Module`] that [`print_module`] renders as text.

mod builder;
mod emit;
mod instr;
mod lower;
mod print;
mod types;

pub use builder::*;
pub use emit::*;
pub use instr::*;
pub use lower::*;
pub use print::*;
pub use types::*;
