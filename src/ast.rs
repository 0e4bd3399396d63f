//! Abstract syntax tree for mini-C
//!
//! Every node keeps the token it was parsed from so later phases can
//! report the lexeme and position without re-lexing.

use crate::token::Token;
use crate::ty::Ty;

/// A complete translation unit
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub externs: Vec<ExternDecl>,
    pub decls: Vec<Decl>,
}

/// A top-level declaration
#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Var(VarDecl),
    Function(FnDecl),
}

/// An extern function prototype
#[derive(Debug, Clone, PartialEq)]
pub struct ExternDecl {
    pub ret: Ty,
    pub name: String,
    pub params: Vec<Param>,
    /// The name token, for diagnostics
    pub token: Token,
}

/// A function definition
#[derive(Debug, Clone, PartialEq)]
pub struct FnDecl {
    pub ret: Ty,
    pub name: String,
    pub params: Vec<Param>,
    pub body: Block,
    pub token: Token,
}

/// A function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub ty: Ty,
    pub name: String,
    pub token: Token,
}

/// A variable declaration (global or block-local)
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub ty: Ty,
    pub name: String,
    pub token: Token,
}

/// A brace-delimited block: declarations first, then statements
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub decls: Vec<VarDecl>,
    pub stmts: Vec<Stmt>,
    /// The opening brace token
    pub token: Token,
}

/// A statement
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expr(Expr),
    Block(Block),
    If(IfStmt),
    While(WhileStmt),
    Return(ReturnStmt),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_block: Block,
    pub else_block: Option<Block>,
    pub token: Token,
}

/// A while loop. The body is a single statement, which may itself
/// be a block.
#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Box<Stmt>,
    pub token: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub token: Token,
}

/// An expression
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    /// The token the expression starts at (operator token for binary
    /// and unary nodes)
    pub token: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    IntLit(i64),
    FloatLit(f64),
    BoolLit(bool),
    Ident(String),
    Assign {
        name: String,
        value: Box<Expr>,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnOp,
        operand: Box<Expr>,
    },
    Call {
        callee: String,
        args: Vec<Expr>,
    },
}

/// Binary operators, strongest-binding last
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

impl BinOp {
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }
}
