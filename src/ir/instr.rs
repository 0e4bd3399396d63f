//! IR Instructions
//!
//! Instruction definitions for the mini-C IR.

use super::types::{BlockId, Constant, IrType, VReg};
use std::fmt;

/// An instruction in the IR
#[derive(Debug, Clone)]
pub struct Instruction {
    /// Result register (None for void instructions)
    pub result: Option<VReg>,
    /// The instruction kind
    pub kind: InstrKind,
}

impl Instruction {
    pub fn new(result: Option<VReg>, kind: InstrKind) -> Self {
        Self { result, kind }
    }
}

/// Kinds of instructions
#[derive(Debug, Clone)]
pub enum InstrKind {
    // ============ Constants ============
    /// Load a constant value
    Const(Constant),

    // ============ Integer arithmetic ============
    Add(VReg, VReg),
    Sub(VReg, VReg),
    Mul(VReg, VReg),
    /// Signed integer division
    SDiv(VReg, VReg),
    /// Signed integer remainder
    SRem(VReg, VReg),
    /// Integer negation
    Neg(VReg),
    /// Bitwise NOT
    Not(VReg),

    // ============ Floating point ============
    FAdd(VReg, VReg),
    FSub(VReg, VReg),
    FMul(VReg, VReg),
    FDiv(VReg, VReg),
    /// Float remainder
    FRem(VReg, VReg),
    /// Float negation
    FNeg(VReg),

    // ============ Comparison ============
    /// Integer comparison (also used for i1)
    ICmp(CmpOp, VReg, VReg),
    /// Float comparison
    FCmp(CmpOp, VReg, VReg),

    // ============ Conversions ============
    /// Signed int to float
    SIToFP(VReg, IrType),
    /// Float to signed int
    FPToSI(VReg, IrType),
    /// Zero extend
    ZExt(VReg, IrType),
    /// Truncate
    Trunc(VReg, IrType),

    // ============ Memory ============
    /// Allocate a named stack slot
    Alloca(IrType, String),
    /// Load from a slot
    Load(VReg),
    /// Store to a slot (ptr, value)
    Store(VReg, VReg),
    /// Reference to a global (returns pointer to global)
    GlobalRef(String),

    // ============ Function calls ============
    /// Call a function
    Call { func: String, args: Vec<VReg> },
}

/// Comparison operators (signed where it matters)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Slt,
    Sle,
    Sgt,
    Sge,
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CmpOp::Eq => "eq",
            CmpOp::Ne => "ne",
            CmpOp::Slt => "slt",
            CmpOp::Sle => "sle",
            CmpOp::Sgt => "sgt",
            CmpOp::Sge => "sge",
        };
        write!(f, "{}", s)
    }
}

/// Block terminators
#[derive(Debug, Clone)]
pub enum Terminator {
    /// Return from function
    Ret(Option<VReg>),
    /// Unconditional branch
    Br(BlockId),
    /// Conditional branch
    CondBr {
        cond: VReg,
        then_block: BlockId,
        else_block: BlockId,
    },
}

/// A basic block: instructions plus one terminator
#[derive(Debug, Clone)]
pub struct BasicBlock {
    pub id: BlockId,
    pub label: String,
    pub instructions: Vec<Instruction>,
    pub terminator: Option<Terminator>,
}

impl BasicBlock {
    pub fn new(id: BlockId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            instructions: Vec::new(),
            terminator: None,
        }
    }
}

impl fmt::Display for InstrKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstrKind::Const(c) => write!(f, "const {}", c),
            InstrKind::Add(a, b) => write!(f, "add {}, {}", a, b),
            InstrKind::Sub(a, b) => write!(f, "sub {}, {}", a, b),
            InstrKind::Mul(a, b) => write!(f, "mul {}, {}", a, b),
            InstrKind::SDiv(a, b) => write!(f, "sdiv {}, {}", a, b),
            InstrKind::SRem(a, b) => write!(f, "srem {}, {}", a, b),
            InstrKind::Neg(v) => write!(f, "neg {}", v),
            InstrKind::Not(v) => write!(f, "not {}", v),
            InstrKind::FAdd(a, b) => write!(f, "fadd {}, {}", a, b),
            InstrKind::FSub(a, b) => write!(f, "fsub {}, {}", a, b),
            InstrKind::FMul(a, b) => write!(f, "fmul {}, {}", a, b),
            InstrKind::FDiv(a, b) => write!(f, "fdiv {}, {}", a, b),
            InstrKind::FRem(a, b) => write!(f, "frem {}, {}", a, b),
            InstrKind::FNeg(v) => write!(f, "fneg {}", v),
            InstrKind::ICmp(op, a, b) => write!(f, "icmp {} {}, {}", op, a, b),
            InstrKind::FCmp(op, a, b) => write!(f, "fcmp {} {}, {}", op, a, b),
            InstrKind::SIToFP(v, ty) => write!(f, "sitofp {} to {}", v, ty),
            InstrKind::FPToSI(v, ty) => write!(f, "fptosi {} to {}", v, ty),
            InstrKind::ZExt(v, ty) => write!(f, "zext {} to {}", v, ty),
            InstrKind::Trunc(v, ty) => write!(f, "trunc {} to {}", v, ty),
            InstrKind::Alloca(ty, name) => write!(f, "alloca {} ; {}", ty, name),
            InstrKind::Load(ptr) => write!(f, "load {}", ptr),
            InstrKind::Store(ptr, value) => write!(f, "store {}, {}", value, ptr),
            InstrKind::GlobalRef(name) => write!(f, "globalref @{}", name),
            InstrKind::Call { func, args } => {
                write!(f, "call @{}(", func)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.result {
            Some(r) => write!(f, "{} = {}", r, self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl fmt::Display for Terminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminator::Ret(None) => write!(f, "ret void"),
            Terminator::Ret(Some(v)) => write!(f, "ret {}", v),
            Terminator::Br(target) => write!(f, "br {}", target),
            Terminator::CondBr {
                cond,
                then_block,
                else_block,
            } => write!(f, "condbr {}, {}, {}", cond, then_block, else_block),
        }
    }
}
