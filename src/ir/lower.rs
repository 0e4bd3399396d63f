//! AST lowering
//!
//! Walks the AST and drives an [`Emitter`], resolving names and
//! inserting type conversions along the way. All semantic checking
//! happens here, interleaved with emission: the first fatal error
//! aborts, narrowing conversions accumulate warnings.
//!
//! Scalars are modeled as stack slots. Every variable gets an alloca;
//! reads load it and writes store it. Short-circuit `&&`/`||` lower to
//! branching control flow around a temporary bool slot.

use super::emit::{ArithOp, Cmp, Emitter};
use crate::ast::*;
use crate::sema::{Binding, Scopes, SemaError, Warning};
use crate::token::Token;
use crate::ty::Ty;
use std::collections::HashMap;

/// A function signature, for call checking
#[derive(Debug, Clone)]
struct FnSig {
    params: Vec<Ty>,
    ret: Ty,
}

/// Lowers a program into emitter calls
pub struct Lowerer<'src, E: Emitter> {
    source: &'src str,
    emitter: E,
    scopes: Scopes<E::Value>,
    functions: HashMap<String, FnSig>,
    warnings: Vec<Warning>,
    /// Declared return type of the function being lowered
    current_ret: Ty,
    /// Counter for naming short-circuit temp slots
    next_tmp: u32,
}

type LowerResult<T> = Result<T, SemaError>;

impl<'src, E: Emitter> Lowerer<'src, E> {
    pub fn new(source: &'src str, emitter: E) -> Self {
        Self {
            source,
            emitter,
            scopes: Scopes::new(),
            functions: HashMap::new(),
            warnings: Vec::new(),
            current_ret: Ty::Void,
            next_tmp: 0,
        }
    }

    /// Lower a whole program. Returns the emitter and the accumulated
    /// warnings; the caller reports warnings after compilation.
    pub fn lower_program(mut self, program: &Program) -> LowerResult<(E, Vec<Warning>)> {
        for ext in &program.externs {
            self.lower_extern(ext)?;
        }
        for decl in &program.decls {
            match decl {
                Decl::Var(var) => self.lower_global(var)?,
                Decl::Function(func) => self.lower_function(func)?,
            }
        }
        Ok((self.emitter, self.warnings))
    }

    fn text(&self, token: &Token) -> String {
        token.text(self.source).to_string()
    }

    fn warn_narrowing(&mut self, from: Ty, to: Ty, token: &Token) {
        self.warnings.push(Warning {
            message: format!("Narrowing conversion from {} to {}", from, to),
            lexeme: self.text(token),
            pos: token.pos,
        });
    }

    // ============ Declarations ============

    fn lower_extern(&mut self, ext: &ExternDecl) -> LowerResult<()> {
        if self.functions.contains_key(&ext.name) {
            return Err(SemaError::FunctionRedeclaration {
                name: ext.name.clone(),
                pos: ext.token.pos,
            });
        }
        let params: Vec<Ty> = ext.params.iter().map(|p| p.ty).collect();
        self.functions.insert(
            ext.name.clone(),
            FnSig {
                params: params.clone(),
                ret: ext.ret,
            },
        );
        self.emitter.declare_extern(&ext.name, &params, ext.ret);
        Ok(())
    }

    fn lower_global(&mut self, var: &VarDecl) -> LowerResult<()> {
        if var.ty == Ty::Void {
            return Err(SemaError::VoidVariable {
                name: var.name.clone(),
                pos: var.token.pos,
            });
        }
        if !self.scopes.declare_global(&var.name, var.ty) {
            return Err(SemaError::GlobalRedeclaration {
                name: var.name.clone(),
                pos: var.token.pos,
            });
        }
        self.emitter.define_global(&var.name, var.ty);
        Ok(())
    }

    fn lower_function(&mut self, func: &FnDecl) -> LowerResult<()> {
        if self.functions.contains_key(&func.name) {
            return Err(SemaError::FunctionRedeclaration {
                name: func.name.clone(),
                pos: func.token.pos,
            });
        }
        // Registered before the body so recursive calls resolve
        self.functions.insert(
            func.name.clone(),
            FnSig {
                params: func.params.iter().map(|p| p.ty).collect(),
                ret: func.ret,
            },
        );

        let params: Vec<(String, Ty)> = func
            .params
            .iter()
            .map(|p| (p.name.clone(), p.ty))
            .collect();
        let incoming = self.emitter.start_function(&func.name, &params, func.ret);
        self.current_ret = func.ret;

        // Parameters live in their own scope around the body, so a
        // body-level local may shadow a parameter.
        self.scopes.enter();
        for (param, value) in func.params.iter().zip(incoming) {
            let slot = self.emitter.alloca(&param.name, param.ty);
            self.emitter.store(slot, value);
            if !self.scopes.declare_local(&param.name, slot, param.ty) {
                return Err(SemaError::Redeclaration {
                    name: param.name.clone(),
                    pos: param.token.pos,
                });
            }
        }

        self.lower_block(&func.body)?;

        // A body that can fall off the end gets a default return: zero
        // for value types, plain return for void. For value types this
        // likely hides a missing `return`, so it also warns.
        if !self.emitter.block_terminated() {
            if func.ret != Ty::Void {
                self.warnings.push(Warning {
                    message: format!(
                        "Function '{}' may reach the end of its body without returning; a zero {} return was inserted",
                        func.name, func.ret
                    ),
                    lexeme: func.name.clone(),
                    pos: func.token.pos,
                });
            }
            match func.ret {
                Ty::Void => self.emitter.ret(None),
                Ty::Int => {
                    let zero = self.emitter.const_int(0);
                    self.emitter.ret(Some(zero));
                }
                Ty::Float => {
                    let zero = self.emitter.const_float(0.0);
                    self.emitter.ret(Some(zero));
                }
                Ty::Bool => {
                    let zero = self.emitter.const_bool(false);
                    self.emitter.ret(Some(zero));
                }
            }
        }

        self.scopes.exit();
        self.emitter.finish_function();
        Ok(())
    }

    // ============ Statements ============

    fn lower_block(&mut self, block: &Block) -> LowerResult<()> {
        self.scopes.enter();

        for decl in &block.decls {
            if decl.ty == Ty::Void {
                return Err(SemaError::VoidVariable {
                    name: decl.name.clone(),
                    pos: decl.token.pos,
                });
            }
            let slot = self.emitter.alloca(&decl.name, decl.ty);
            if !self.scopes.declare_local(&decl.name, slot, decl.ty) {
                return Err(SemaError::Redeclaration {
                    name: decl.name.clone(),
                    pos: decl.token.pos,
                });
            }
        }

        for stmt in &block.stmts {
            self.lower_stmt(stmt)?;
            // Nothing after a return is reachable, whether the return
            // was a direct statement or came out of a nested block
            if self.emitter.block_terminated() {
                break;
            }
        }

        self.scopes.exit();
        Ok(())
    }

    fn lower_stmt(&mut self, stmt: &Stmt) -> LowerResult<()> {
        match stmt {
            Stmt::Expr(expr) => {
                self.lower_expr(expr)?;
                Ok(())
            }
            Stmt::Block(block) => self.lower_block(block),
            Stmt::If(stmt) => self.lower_if(stmt),
            Stmt::While(stmt) => self.lower_while(stmt),
            Stmt::Return(stmt) => {
                // The returned value keeps its expression type; it is
                // not coerced to the declared return type.
                match &stmt.value {
                    Some(expr) => {
                        let (value, _) = self.lower_value(expr)?;
                        self.emitter.ret(Some(value));
                    }
                    None => self.emitter.ret(None),
                }
                Ok(())
            }
        }
    }

    fn lower_cond(&mut self, expr: &Expr) -> LowerResult<E::Value> {
        let (value, ty) = self.lower_value(expr)?;
        self.cast(value, ty, Ty::Bool, &expr.token)
    }

    fn lower_if(&mut self, stmt: &IfStmt) -> LowerResult<()> {
        let cond = self.lower_cond(&stmt.cond)?;

        let then_block = self.emitter.create_block("if.then");
        let end_block = self.emitter.create_block("if.end");

        match &stmt.else_block {
            Some(else_body) => {
                let else_block = self.emitter.create_block("if.else");
                self.emitter.cond_br(cond, then_block, else_block);

                self.emitter.start_block(then_block);
                self.lower_block(&stmt.then_block)?;
                if !self.emitter.block_terminated() {
                    self.emitter.br(end_block);
                }

                self.emitter.start_block(else_block);
                self.lower_block(else_body)?;
                if !self.emitter.block_terminated() {
                    self.emitter.br(end_block);
                }
            }
            None => {
                self.emitter.cond_br(cond, then_block, end_block);

                self.emitter.start_block(then_block);
                self.lower_block(&stmt.then_block)?;
                if !self.emitter.block_terminated() {
                    self.emitter.br(end_block);
                }
            }
        }

        self.emitter.start_block(end_block);
        Ok(())
    }

    fn lower_while(&mut self, stmt: &WhileStmt) -> LowerResult<()> {
        let cond_block = self.emitter.create_block("while.cond");
        self.emitter.br(cond_block);

        self.emitter.start_block(cond_block);
        let cond = self.lower_cond(&stmt.cond)?;
        let body_block = self.emitter.create_block("while.body");
        let end_block = self.emitter.create_block("while.end");
        self.emitter.cond_br(cond, body_block, end_block);

        self.emitter.start_block(body_block);
        self.lower_stmt(&stmt.body)?;
        if !self.emitter.block_terminated() {
            self.emitter.br(cond_block);
        }

        self.emitter.start_block(end_block);
        Ok(())
    }

    // ============ Expressions ============

    /// Lower an expression that must produce a value
    fn lower_value(&mut self, expr: &Expr) -> LowerResult<(E::Value, Ty)> {
        let (value, ty) = self.lower_expr(expr)?;
        match value {
            Some(value) => Ok((value, ty)),
            None => Err(SemaError::VoidOperand {
                lexeme: self.text(&expr.token),
                pos: expr.token.pos,
            }),
        }
    }

    /// Lower an expression. Void calls produce no value.
    fn lower_expr(&mut self, expr: &Expr) -> LowerResult<(Option<E::Value>, Ty)> {
        match &expr.kind {
            ExprKind::IntLit(v) => {
                let value = self.emitter.const_int(*v);
                Ok((Some(value), Ty::Int))
            }
            ExprKind::FloatLit(v) => {
                let value = self.emitter.const_float(*v);
                Ok((Some(value), Ty::Float))
            }
            ExprKind::BoolLit(v) => {
                let value = self.emitter.const_bool(*v);
                Ok((Some(value), Ty::Bool))
            }
            ExprKind::Ident(name) => {
                let (slot, ty) = self.variable_slot(name, &expr.token)?;
                let value = self.emitter.load(slot, ty);
                Ok((Some(value), ty))
            }
            ExprKind::Assign { name, value } => {
                let (rhs, rhs_ty) = self.lower_value(value)?;
                let (slot, ty) = self.variable_slot(name, &expr.token)?;
                // The stored value is coerced to the declared type of
                // the variable; the assignment yields the coerced value.
                let rhs = self.cast(rhs, rhs_ty, ty, &value.token)?;
                self.emitter.store(slot, rhs);
                Ok((Some(rhs), ty))
            }
            ExprKind::Binary { op, lhs, rhs } => self.lower_binary(*op, lhs, rhs, &expr.token),
            ExprKind::Unary { op, operand } => {
                let value = self.lower_unary(*op, operand, &expr.token)?;
                Ok((Some(value.0), value.1))
            }
            ExprKind::Call { callee, args } => self.lower_call(callee, args, &expr.token),
        }
    }

    /// Resolve a variable to its slot, materializing global slots
    fn variable_slot(&mut self, name: &str, token: &Token) -> LowerResult<(E::Value, Ty)> {
        match self.scopes.lookup(name) {
            Some(Binding::Local { slot, ty }) => Ok((slot, ty)),
            Some(Binding::Global { ty }) => {
                let slot = self.emitter.global_slot(name);
                Ok((slot, ty))
            }
            None => Err(SemaError::UnknownVariable {
                name: name.to_string(),
                pos: token.pos,
            }),
        }
    }

    fn lower_binary(
        &mut self,
        op: BinOp,
        lhs: &Expr,
        rhs: &Expr,
        token: &Token,
    ) -> LowerResult<(Option<E::Value>, Ty)> {
        if op.is_logical() {
            let value = self.lower_short_circuit(op, lhs, rhs)?;
            return Ok((Some(value), Ty::Bool));
        }

        // A literal zero divisor is rejected before any code is emitted
        if matches!(op, BinOp::Div | BinOp::Rem) && literal_is_zero(&rhs.kind) {
            return Err(SemaError::DivisionByZero { pos: token.pos });
        }

        let (lv, lt) = self.lower_value(lhs)?;
        let (rv, rt) = self.lower_value(rhs)?;

        // Widen both operands to the wider type, then pick the int or
        // float instruction family.
        let wide = Ty::widest(lt, rt);
        let lv = self.cast(lv, lt, wide, &lhs.token)?;
        let rv = self.cast(rv, rt, wide, &rhs.token)?;

        if op.is_comparison() {
            let cmp = cmp_of(op);
            let value = if wide == Ty::Float {
                self.emitter.float_cmp(cmp, lv, rv)
            } else {
                self.emitter.int_cmp(cmp, lv, rv)
            };
            return Ok((Some(value), Ty::Bool));
        }

        let arith = arith_of(op);
        let value = if wide == Ty::Float {
            self.emitter.float_binary(arith, lv, rv)
        } else {
            self.emitter.int_binary(arith, lv, rv)
        };
        Ok((Some(value), wide))
    }

    /// Lower `&&` or `||` as branching control flow.
    ///
    /// The result lives in a temporary bool slot: the left operand
    /// decides whether the right operand runs at all, a dedicated block
    /// stores the known outcome for the skipped side, and the join
    /// block loads the slot.
    fn lower_short_circuit(&mut self, op: BinOp, lhs: &Expr, rhs: &Expr) -> LowerResult<E::Value> {
        let (prefix, known) = match op {
            BinOp::And => ("land", false),
            BinOp::Or => ("lor", true),
            _ => unreachable!("not a logical operator: {:?}", op),
        };

        let tmp_name = format!("{}.tmp{}", prefix, self.next_tmp);
        self.next_tmp += 1;
        let tmp = self.emitter.alloca(&tmp_name, Ty::Bool);

        let rhs_block = self.emitter.create_block(&format!("{}.rhs", prefix));
        let known_block = self.emitter.create_block(&format!("{}.known", prefix));
        let end_block = self.emitter.create_block(&format!("{}.end", prefix));

        let (lv, lt) = self.lower_value(lhs)?;
        let lv = self.cast(lv, lt, Ty::Bool, &lhs.token)?;
        if op == BinOp::And {
            self.emitter.cond_br(lv, rhs_block, known_block);
        } else {
            self.emitter.cond_br(lv, known_block, rhs_block);
        }

        self.emitter.start_block(rhs_block);
        let (rv, rt) = self.lower_value(rhs)?;
        let rv = self.cast(rv, rt, Ty::Bool, &rhs.token)?;
        self.emitter.store(tmp, rv);
        self.emitter.br(end_block);

        self.emitter.start_block(known_block);
        let known = self.emitter.const_bool(known);
        self.emitter.store(tmp, known);
        self.emitter.br(end_block);

        self.emitter.start_block(end_block);
        Ok(self.emitter.load(tmp, Ty::Bool))
    }

    fn lower_unary(
        &mut self,
        op: UnOp,
        operand: &Expr,
        token: &Token,
    ) -> LowerResult<(E::Value, Ty)> {
        let (value, ty) = self.lower_value(operand)?;
        match op {
            UnOp::Neg => match ty {
                Ty::Float => Ok((self.emitter.fneg(value), Ty::Float)),
                Ty::Int => Ok((self.emitter.neg(value), Ty::Int)),
                Ty::Bool => {
                    // Negating a bool promotes it to int first
                    let value = self.cast(value, Ty::Bool, Ty::Int, token)?;
                    Ok((self.emitter.neg(value), Ty::Int))
                }
                Ty::Void => Err(SemaError::VoidOperand {
                    lexeme: self.text(token),
                    pos: token.pos,
                }),
            },
            UnOp::Not => match ty {
                Ty::Bool => Ok((self.emitter.not(value), Ty::Bool)),
                // On an int, `!` is a bitwise complement
                Ty::Int => Ok((self.emitter.not(value), Ty::Int)),
                Ty::Float => {
                    let value = self.cast(value, Ty::Float, Ty::Bool, token)?;
                    Ok((self.emitter.not(value), Ty::Bool))
                }
                Ty::Void => Err(SemaError::VoidOperand {
                    lexeme: self.text(token),
                    pos: token.pos,
                }),
            },
        }
    }

    fn lower_call(
        &mut self,
        callee: &str,
        args: &[Expr],
        token: &Token,
    ) -> LowerResult<(Option<E::Value>, Ty)> {
        let sig = match self.functions.get(callee) {
            Some(sig) => sig.clone(),
            None => {
                return Err(SemaError::UnknownFunction {
                    name: callee.to_string(),
                    pos: token.pos,
                })
            }
        };

        if args.len() != sig.params.len() {
            return Err(SemaError::ArityMismatch {
                name: callee.to_string(),
                expected: sig.params.len(),
                found: args.len(),
                pos: token.pos,
            });
        }

        // Arguments must match the parameter types exactly; calls get
        // no implicit widening.
        let mut values = Vec::with_capacity(args.len());
        for (index, (arg, &expected)) in args.iter().zip(&sig.params).enumerate() {
            let (value, found) = self.lower_value(arg)?;
            if found != expected {
                return Err(SemaError::ArgTypeMismatch {
                    name: callee.to_string(),
                    index: index + 1,
                    expected,
                    found,
                    pos: arg.token.pos,
                });
            }
            values.push(value);
        }

        let result = self.emitter.call(callee, &values, sig.ret);
        Ok((result, sig.ret))
    }

    /// Convert a value between language types.
    ///
    /// Widening along bool < int < float is silent. Narrowing emits a
    /// warning and converts anyway. Anything involving void is fatal.
    fn cast(&mut self, value: E::Value, from: Ty, to: Ty, token: &Token) -> LowerResult<E::Value> {
        if from == to {
            return Ok(value);
        }
        match (from, to) {
            (Ty::Int, Ty::Float) => Ok(self.emitter.int_to_float(value)),
            (Ty::Bool, Ty::Float) => Ok(self.emitter.bool_to_float(value)),
            (Ty::Bool, Ty::Int) => Ok(self.emitter.bool_to_int(value)),
            (Ty::Float, Ty::Int) => {
                self.warn_narrowing(from, to, token);
                Ok(self.emitter.float_to_int(value))
            }
            (Ty::Float, Ty::Bool) => {
                self.warn_narrowing(from, to, token);
                Ok(self.emitter.float_to_bool(value))
            }
            (Ty::Int, Ty::Bool) => {
                self.warn_narrowing(from, to, token);
                Ok(self.emitter.int_to_bool(value))
            }
            _ => Err(SemaError::UnsupportedCast {
                from,
                to,
                pos: token.pos,
            }),
        }
    }
}

fn literal_is_zero(kind: &ExprKind) -> bool {
    match kind {
        ExprKind::IntLit(0) => true,
        ExprKind::BoolLit(false) => true,
        ExprKind::FloatLit(v) => *v == 0.0,
        _ => false,
    }
}

fn cmp_of(op: BinOp) -> Cmp {
    match op {
        BinOp::Eq => Cmp::Eq,
        BinOp::Ne => Cmp::Ne,
        BinOp::Lt => Cmp::Lt,
        BinOp::Le => Cmp::Le,
        BinOp::Gt => Cmp::Gt,
        BinOp::Ge => Cmp::Ge,
        _ => unreachable!("not a comparison: {:?}", op),
    }
}

fn arith_of(op: BinOp) -> ArithOp {
    match op {
        BinOp::Add => ArithOp::Add,
        BinOp::Sub => ArithOp::Sub,
        BinOp::Mul => ArithOp::Mul,
        BinOp::Div => ArithOp::Div,
        BinOp::Rem => ArithOp::Rem,
        _ => unreachable!("not arithmetic: {:?}", op),
    }
}

#[cfg(test)]
mod tests {
    use super::super::instr::{InstrKind, Terminator};
    use super::super::types::{Constant, Function, Module};
    use super::super::IrBuilder;
    use super::*;
    use crate::parser;

    fn lower(source: &str) -> Result<(Module, Vec<Warning>), SemaError> {
        let program = parser::parse(source).expect("parse failed");
        let lowerer = Lowerer::new(source, IrBuilder::new("test"));
        let (builder, warnings) = lowerer.lower_program(&program)?;
        Ok((builder.finish(), warnings))
    }

    fn lower_ok(source: &str) -> (Module, Vec<Warning>) {
        lower(source).expect("lowering failed")
    }

    fn func<'a>(module: &'a Module, name: &str) -> &'a Function {
        module.function(name).expect("function not found")
    }

    fn all_instrs(f: &Function) -> Vec<&InstrKind> {
        f.blocks
            .iter()
            .flat_map(|b| b.instructions.iter().map(|i| &i.kind))
            .collect()
    }

    fn has_instr(f: &Function, pred: impl Fn(&InstrKind) -> bool) -> bool {
        all_instrs(f).into_iter().any(pred)
    }

    #[test]
    fn test_return_constant() {
        let (module, warnings) = lower_ok("int main() { return 7; }");
        let f = func(&module, "main");
        assert!(warnings.is_empty());
        assert!(has_instr(f, |k| matches!(
            k,
            InstrKind::Const(Constant::Int(7))
        )));
        assert!(matches!(
            f.blocks[0].terminator,
            Some(Terminator::Ret(Some(_)))
        ));
    }

    #[test]
    fn test_int_plus_float_promotes() {
        let (module, warnings) = lower_ok("float f() { return 1 + 2.5; }");
        let f = func(&module, "f");
        assert!(warnings.is_empty());
        assert!(has_instr(f, |k| matches!(k, InstrKind::SIToFP(_, _))));
        assert!(has_instr(f, |k| matches!(k, InstrKind::FAdd(_, _))));
        assert!(!has_instr(f, |k| matches!(k, InstrKind::Add(_, _))));
    }

    #[test]
    fn test_bool_plus_int_promotes() {
        let (module, warnings) = lower_ok("int f() { return true + 2; }");
        let f = func(&module, "f");
        assert!(warnings.is_empty());
        assert!(has_instr(f, |k| matches!(k, InstrKind::ZExt(_, _))));
        assert!(has_instr(f, |k| matches!(k, InstrKind::Add(_, _))));
    }

    #[test]
    fn test_comparison_yields_bool() {
        let (module, _) = lower_ok("bool f() { return 1 < 2; }");
        let f = func(&module, "f");
        assert!(has_instr(f, |k| matches!(k, InstrKind::ICmp(_, _, _))));
    }

    #[test]
    fn test_float_comparison() {
        let (module, _) = lower_ok("bool f() { return 1.5 < 2; }");
        let f = func(&module, "f");
        assert!(has_instr(f, |k| matches!(k, InstrKind::FCmp(_, _, _))));
    }

    #[test]
    fn test_division_by_literal_zero_is_fatal() {
        let err = lower("int f() { return 1 / 0; }").unwrap_err();
        assert!(matches!(err, SemaError::DivisionByZero { .. }));
    }

    #[test]
    fn test_remainder_by_literal_zero_is_fatal() {
        let err = lower("int f() { return 1 % 0; }").unwrap_err();
        assert!(matches!(err, SemaError::DivisionByZero { .. }));
    }

    #[test]
    fn test_division_by_runtime_zero_is_accepted() {
        // only a literal zero divisor is rejected
        let result = lower("int f(int n) { return 1 / n; }");
        assert!(result.is_ok());
    }

    #[test]
    fn test_short_circuit_and_skips_rhs() {
        let source = "extern int g(); bool f(bool b) { return b && g() > 0; }";
        let (module, _) = lower_ok(source);
        let f = func(&module, "f");

        // The entry block branches on the left operand. The right
        // operand's call must live only on the true edge.
        let entry = &f.blocks[0];
        let (then_id, else_id) = match entry.terminator {
            Some(Terminator::CondBr {
                then_block,
                else_block,
                ..
            }) => (then_block, else_block),
            ref other => panic!("expected condbr, got {:?}", other),
        };

        let then_block = f.block(then_id).unwrap();
        let else_block = f.block(else_id).unwrap();
        assert!(then_block
            .instructions
            .iter()
            .any(|i| matches!(i.kind, InstrKind::Call { .. })));
        assert!(!else_block
            .instructions
            .iter()
            .any(|i| matches!(i.kind, InstrKind::Call { .. })));
    }

    #[test]
    fn test_short_circuit_or_branch_order() {
        let source = "extern int g(); bool f(bool b) { return b || g() > 0; }";
        let (module, _) = lower_ok(source);
        let f = func(&module, "f");

        let entry = &f.blocks[0];
        let (then_id, _) = match entry.terminator {
            Some(Terminator::CondBr {
                then_block,
                else_block,
                ..
            }) => (then_block, else_block),
            ref other => panic!("expected condbr, got {:?}", other),
        };

        // For `||` a true left operand jumps straight to the known
        // outcome, so the call is on the false edge.
        let then_block = f.block(then_id).unwrap();
        assert!(!then_block
            .instructions
            .iter()
            .any(|i| matches!(i.kind, InstrKind::Call { .. })));
    }

    #[test]
    fn test_redeclaration_in_same_block_is_fatal() {
        let err = lower("int f() { int x; int x; return 0; }").unwrap_err();
        assert!(matches!(err, SemaError::Redeclaration { .. }));
    }

    #[test]
    fn test_shadowing_in_nested_block_is_fine() {
        let source = r#"
            int f() {
                int x;
                x = 1;
                { int x; x = 2; }
                return x;
            }
        "#;
        assert!(lower(source).is_ok());
    }

    #[test]
    fn test_local_shadows_parameter() {
        let result = lower("int f(int x) { int x; x = 2; return x; }");
        assert!(result.is_ok());
    }

    #[test]
    fn test_global_redeclaration_is_fatal() {
        let err = lower("int g; int g; int main() { return 0; }").unwrap_err();
        assert!(matches!(err, SemaError::GlobalRedeclaration { .. }));
    }

    #[test]
    fn test_function_redeclaration_is_fatal() {
        let err = lower("int f() { return 0; } int f() { return 1; }").unwrap_err();
        assert!(matches!(err, SemaError::FunctionRedeclaration { .. }));
    }

    #[test]
    fn test_unknown_variable_is_fatal() {
        let err = lower("int f() { return y; }").unwrap_err();
        assert!(matches!(err, SemaError::UnknownVariable { .. }));
    }

    #[test]
    fn test_unknown_function_is_fatal() {
        let err = lower("int f() { return g(); }").unwrap_err();
        assert!(matches!(err, SemaError::UnknownFunction { .. }));
    }

    #[test]
    fn test_call_arguments_are_not_widened() {
        // a float argument for an int parameter is fatal, even though
        // assignments would narrow with a warning
        let source = "int id(int x) { return x; } int f() { return id(1.5); }";
        let err = lower(source).unwrap_err();
        assert!(matches!(err, SemaError::ArgTypeMismatch { .. }));
    }

    #[test]
    fn test_call_arity_mismatch_is_fatal() {
        let source = "int id(int x) { return x; } int f() { return id(1, 2); }";
        let err = lower(source).unwrap_err();
        assert!(matches!(err, SemaError::ArityMismatch { .. }));
    }

    #[test]
    fn test_matching_call_is_accepted() {
        let source = "int id(int x) { return x; } int f() { return id(41); }";
        let (module, warnings) = lower_ok(source);
        assert!(warnings.is_empty());
        let f = func(&module, "f");
        assert!(has_instr(f, |k| matches!(k, InstrKind::Call { .. })));
    }

    #[test]
    fn test_missing_return_synthesizes_zero() {
        let (module, _) = lower_ok("int f() { }");
        let f = func(&module, "f");
        assert!(has_instr(f, |k| matches!(
            k,
            InstrKind::Const(Constant::Int(0))
        )));
        let last = f.blocks.last().unwrap();
        assert!(matches!(last.terminator, Some(Terminator::Ret(Some(_)))));
    }

    #[test]
    fn test_missing_return_warns_for_value_types() {
        let (_, warnings) = lower_ok("int f() { }");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("without returning"));
        assert_eq!(warnings[0].lexeme, "f");
    }

    #[test]
    fn test_missing_return_in_void_function_is_silent() {
        let (_, warnings) = lower_ok("void f() { }");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_missing_return_in_void_function() {
        let (module, _) = lower_ok("void f() { }");
        let f = func(&module, "f");
        assert!(matches!(
            f.blocks.last().unwrap().terminator,
            Some(Terminator::Ret(None))
        ));
    }

    #[test]
    fn test_narrowing_assignment_warns() {
        let (_, warnings) = lower_ok("int f() { int x; x = 2.5; return x; }");
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].message,
            "Narrowing conversion from float to int"
        );
    }

    #[test]
    fn test_widening_assignment_is_silent() {
        let (_, warnings) = lower_ok("float f() { float x; x = 2; return x; }");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_return_value_keeps_its_type() {
        // returning an int from a float function emits no conversion
        let (module, warnings) = lower_ok("float f() { return 2; }");
        let f = func(&module, "f");
        assert!(warnings.is_empty());
        assert!(!has_instr(f, |k| matches!(k, InstrKind::SIToFP(_, _))));
    }

    #[test]
    fn test_if_condition_narrows_with_warning() {
        let (_, warnings) = lower_ok("int f() { if (1) { return 1; } return 0; }");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].message, "Narrowing conversion from int to bool");
    }

    #[test]
    fn test_not_on_int_is_bitwise() {
        let (module, warnings) = lower_ok("int f(int x) { return !x; }");
        let f = func(&module, "f");
        assert!(warnings.is_empty());
        assert!(has_instr(f, |k| matches!(k, InstrKind::Not(_))));
    }

    #[test]
    fn test_not_on_float_narrows_first() {
        let (module, warnings) = lower_ok("bool f(float x) { return !x; }");
        let f = func(&module, "f");
        assert_eq!(warnings.len(), 1);
        assert!(has_instr(f, |k| matches!(k, InstrKind::FPToSI(_, _))));
        assert!(has_instr(f, |k| matches!(k, InstrKind::Not(_))));
    }

    #[test]
    fn test_negate_bool_promotes_to_int() {
        let (module, warnings) = lower_ok("int f(bool b) { return -b; }");
        let f = func(&module, "f");
        assert!(warnings.is_empty());
        assert!(has_instr(f, |k| matches!(k, InstrKind::ZExt(_, _))));
        assert!(has_instr(f, |k| matches!(k, InstrKind::Neg(_))));
    }

    #[test]
    fn test_global_access() {
        let source = "int g; int f() { g = 3; return g; }";
        let (module, _) = lower_ok(source);
        assert_eq!(module.globals.len(), 1);
        let f = func(&module, "f");
        assert!(has_instr(f, |k| matches!(k, InstrKind::GlobalRef(_))));
    }

    #[test]
    fn test_void_call_as_statement() {
        let source = "extern void emit(int x); void f() { emit(1); }";
        let (module, _) = lower_ok(source);
        let f = func(&module, "f");
        // the call has no result register
        let call = f.blocks[0]
            .instructions
            .iter()
            .find(|i| matches!(i.kind, InstrKind::Call { .. }))
            .unwrap();
        assert!(call.result.is_none());
    }

    #[test]
    fn test_void_call_as_operand_is_fatal() {
        let source = "extern void emit(int x); int f() { return emit(1) + 1; }";
        let err = lower(source).unwrap_err();
        assert!(matches!(err, SemaError::VoidOperand { .. }));
    }

    #[test]
    fn test_while_loop_shape() {
        let source = "int f() { int i; i = 0; while (i < 3) i = i + 1; return i; }";
        let (module, _) = lower_ok(source);
        let f = func(&module, "f");
        let labels: Vec<&str> = f.blocks.iter().map(|b| b.label.as_str()).collect();
        assert!(labels.contains(&"while.cond"));
        assert!(labels.contains(&"while.body"));
        assert!(labels.contains(&"while.end"));
        // the body loops back to the condition
        let body = f.blocks.iter().find(|b| b.label == "while.body").unwrap();
        let cond = f.blocks.iter().find(|b| b.label == "while.cond").unwrap();
        assert!(matches!(
            body.terminator,
            Some(Terminator::Br(t)) if t == cond.id
        ));
    }

    #[test]
    fn test_code_after_return_is_dropped() {
        let (module, _) = lower_ok("int f() { return 1; return 2; }");
        let f = func(&module, "f");
        assert!(!has_instr(f, |k| matches!(
            k,
            InstrKind::Const(Constant::Int(2))
        )));
    }

    #[test]
    fn test_no_code_after_nested_block_return() {
        // a store after a nested block that returns must not end up in
        // the already-returned block
        let source = "int g; int f() { { return 1; } g = 2; return 0; }";
        let (module, _) = lower_ok(source);
        let f = func(&module, "f");
        assert!(!has_instr(f, |k| matches!(
            k,
            InstrKind::Const(Constant::Int(2))
        )));
        assert!(!has_instr(f, |k| matches!(k, InstrKind::Store(_, _))));
        assert!(matches!(
            f.blocks[0].terminator,
            Some(Terminator::Ret(Some(_)))
        ));
    }

    #[test]
    fn test_recursive_call_resolves() {
        let source = "int fact(int n) { if (n < 2) { return 1; } return n * fact(n - 1); }";
        assert!(lower(source).is_ok());
    }

    #[test]
    fn test_warnings_arrive_in_order() {
        let source = "int f() { int x; x = 1.5; x = 2.5; return x; }";
        let (_, warnings) = lower_ok(source);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].pos.line <= warnings[1].pos.line);
        assert_eq!(warnings[0].lexeme, "1.5");
        assert_eq!(warnings[1].lexeme, "2.5");
    }
}
