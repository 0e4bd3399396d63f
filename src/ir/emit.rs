//! The code emitter interface
//!
//! Lowering talks to a backend through this trait instead of building
//! IR directly. The trait speaks language types; each backend maps them
//! to its own representation. [`super::IrBuilder`] is the in-crate
//! implementation; tests can substitute their own.

use crate::ty::Ty;
use std::fmt::Debug;

/// Arithmetic operators, after the int/float split has been decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// A backend that lowering drives.
///
/// `Value` identifies an SSA value or stack slot; `Block` identifies a
/// basic block. Both are cheap handles the backend hands out.
pub trait Emitter {
    type Value: Copy + Debug;
    type Block: Copy + PartialEq + Debug;

    // ============ Declarations ============

    /// Declare an external function prototype
    fn declare_extern(&mut self, name: &str, params: &[Ty], ret: Ty);

    /// Define a zero-initialized global variable
    fn define_global(&mut self, name: &str, ty: Ty);

    /// Start a function body. Returns the incoming parameter values in
    /// declaration order; the entry block is current afterwards.
    fn start_function(&mut self, name: &str, params: &[(String, Ty)], ret: Ty) -> Vec<Self::Value>;

    /// Finish the current function
    fn finish_function(&mut self);

    // ============ Blocks ============

    /// Create a new block in the current function
    fn create_block(&mut self, label: &str) -> Self::Block;

    /// Make `block` the insertion point
    fn start_block(&mut self, block: Self::Block);

    /// Whether the current block already has a terminator
    fn block_terminated(&self) -> bool;

    // ============ Constants ============

    fn const_int(&mut self, value: i64) -> Self::Value;
    fn const_float(&mut self, value: f64) -> Self::Value;
    fn const_bool(&mut self, value: bool) -> Self::Value;

    // ============ Memory ============

    /// Allocate a named stack slot in the current function
    fn alloca(&mut self, name: &str, ty: Ty) -> Self::Value;

    /// Load the value held in a slot
    fn load(&mut self, slot: Self::Value, ty: Ty) -> Self::Value;

    /// Store a value into a slot
    fn store(&mut self, slot: Self::Value, value: Self::Value);

    /// Get the slot of a global variable
    fn global_slot(&mut self, name: &str) -> Self::Value;

    // ============ Arithmetic and comparison ============

    fn int_binary(&mut self, op: ArithOp, lhs: Self::Value, rhs: Self::Value) -> Self::Value;
    fn float_binary(&mut self, op: ArithOp, lhs: Self::Value, rhs: Self::Value) -> Self::Value;
    fn int_cmp(&mut self, op: Cmp, lhs: Self::Value, rhs: Self::Value) -> Self::Value;
    fn float_cmp(&mut self, op: Cmp, lhs: Self::Value, rhs: Self::Value) -> Self::Value;

    fn neg(&mut self, value: Self::Value) -> Self::Value;
    fn fneg(&mut self, value: Self::Value) -> Self::Value;
    /// Bitwise complement of a bool (i1)
    fn not(&mut self, value: Self::Value) -> Self::Value;

    // ============ Conversions ============

    fn int_to_float(&mut self, value: Self::Value) -> Self::Value;
    fn bool_to_float(&mut self, value: Self::Value) -> Self::Value;
    fn bool_to_int(&mut self, value: Self::Value) -> Self::Value;
    fn float_to_int(&mut self, value: Self::Value) -> Self::Value;
    fn float_to_bool(&mut self, value: Self::Value) -> Self::Value;
    fn int_to_bool(&mut self, value: Self::Value) -> Self::Value;

    // ============ Calls and control flow ============

    /// Call a function. Returns None for void calls.
    fn call(&mut self, name: &str, args: &[Self::Value], ret: Ty) -> Option<Self::Value>;

    /// Terminate the current block with a return
    fn ret(&mut self, value: Option<Self::Value>);

    /// Terminate the current block with an unconditional branch
    fn br(&mut self, target: Self::Block);

    /// Terminate the current block with a conditional branch
    fn cond_br(&mut self, cond: Self::Value, then_block: Self::Block, else_block: Self::Block);
}
