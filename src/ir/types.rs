//! IR Types
//!
//! Type representations for the mini-C IR.

use crate::ty::Ty;
use std::fmt;

/// A virtual register (SSA value)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VReg(pub u32);

impl fmt::Display for VReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// A basic block label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub u32);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

/// IR value types. Each language type maps to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrType {
    /// Void/unit type
    Void,
    /// Boolean (1 bit)
    I1,
    /// 32-bit signed integer
    I32,
    /// 64-bit float
    F64,
}

impl IrType {
    /// Lower a language type to its IR type
    pub fn from_ty(ty: Ty) -> Self {
        match ty {
            Ty::Void => IrType::Void,
            Ty::Bool => IrType::I1,
            Ty::Int => IrType::I32,
            Ty::Float => IrType::F64,
        }
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::Void => write!(f, "void"),
            IrType::I1 => write!(f, "i1"),
            IrType::I32 => write!(f, "i32"),
            IrType::F64 => write!(f, "f64"),
        }
    }
}

/// A constant value
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(v) => write!(f, "{}", v),
            Constant::Float(v) => write!(f, "{:?}", v),
            Constant::Bool(v) => write!(f, "{}", v),
        }
    }
}

/// A module: one translation unit of IR
#[derive(Debug, Clone)]
pub struct Module {
    pub name: String,
    pub functions: Vec<Function>,
    pub globals: Vec<Global>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: Vec::new(),
            globals: Vec::new(),
        }
    }

    /// Look up a function by name
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }
}

/// A global variable, zero-initialized
#[derive(Debug, Clone)]
pub struct Global {
    pub name: String,
    pub ty: IrType,
}

/// A function in the IR
#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    /// Parameter registers and their types (empty vregs for externals)
    pub params: Vec<(VReg, IrType)>,
    pub ret_type: IrType,
    pub blocks: Vec<super::instr::BasicBlock>,
    /// External declaration, no body
    pub is_external: bool,
}

impl Function {
    pub fn new(name: impl Into<String>, params: Vec<(VReg, IrType)>, ret_type: IrType) -> Self {
        Self {
            name: name.into(),
            params,
            ret_type,
            blocks: Vec::new(),
            is_external: false,
        }
    }

    /// Look up a block by its ID
    pub fn block(&self, id: BlockId) -> Option<&super::instr::BasicBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }
}
