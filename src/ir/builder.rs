//! IR Builder
//!
//! Helper for constructing IR instructions and basic blocks, and the
//! in-crate [`Emitter`] backend.

use super::emit::{ArithOp, Cmp, Emitter};
use super::instr::{BasicBlock, CmpOp, InstrKind, Instruction, Terminator};
use super::types::{BlockId, Constant, Function, Global, IrType, Module, VReg};
use crate::ty::Ty;

/// Builder for constructing IR
pub struct IrBuilder {
    /// Next virtual register ID
    next_vreg: u32,
    /// Next block ID
    next_block: u32,
    /// Current module being built
    module: Module,
    /// Current function being built
    current_fn: Option<Function>,
    /// Current block being built
    current_block: Option<BasicBlock>,
    /// Labels of blocks created but not yet started
    pending_labels: Vec<(BlockId, String)>,
}

impl IrBuilder {
    /// Create a new IR builder
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            next_vreg: 0,
            next_block: 0,
            module: Module::new(module_name),
            current_fn: None,
            current_block: None,
            pending_labels: Vec::new(),
        }
    }

    /// Finish building and return the module
    pub fn finish(mut self) -> Module {
        self.end_function();
        self.module
    }

    /// Create a fresh virtual register
    fn fresh_vreg(&mut self) -> VReg {
        let vreg = VReg(self.next_vreg);
        self.next_vreg += 1;
        vreg
    }

    /// Create a fresh block ID
    fn fresh_block(&mut self, label: impl Into<String>) -> BlockId {
        let id = BlockId(self.next_block);
        self.next_block += 1;
        self.pending_labels.push((id, label.into()));
        id
    }

    fn label_of(&mut self, id: BlockId) -> String {
        match self.pending_labels.iter().position(|(b, _)| *b == id) {
            Some(i) => self.pending_labels.remove(i).1,
            None => format!("bb{}", id.0),
        }
    }

    /// Flush the current block into the current function
    fn seal_block(&mut self) {
        if let Some(block) = self.current_block.take() {
            if let Some(ref mut func) = self.current_fn {
                func.blocks.push(block);
            }
        }
    }

    /// Flush the current function into the module
    fn end_function(&mut self) {
        self.seal_block();
        if let Some(func) = self.current_fn.take() {
            self.module.functions.push(func);
        }
    }

    // ============ Instruction emission ============

    /// Append an instruction to the current block. A terminated block
    /// accepts nothing further, so instructions emitted past a `ret`
    /// or branch are dropped rather than printed ahead of it.
    fn emit(&mut self, result: Option<VReg>, kind: InstrKind) -> Option<VReg> {
        if let Some(ref mut block) = self.current_block {
            if block.terminator.is_none() {
                block.instructions.push(Instruction::new(result, kind));
            }
        }
        result
    }

    fn emit_with_result(&mut self, kind: InstrKind) -> VReg {
        let result = self.fresh_vreg();
        self.emit(Some(result), kind);
        result
    }

    /// Set the current block's terminator, unless it already has one.
    /// A block that returned early must keep its first terminator.
    fn terminate(&mut self, term: Terminator) {
        if let Some(ref mut block) = self.current_block {
            if block.terminator.is_none() {
                block.terminator = Some(term);
            }
        }
    }
}

fn cmp_op(op: Cmp) -> CmpOp {
    match op {
        Cmp::Eq => CmpOp::Eq,
        Cmp::Ne => CmpOp::Ne,
        Cmp::Lt => CmpOp::Slt,
        Cmp::Le => CmpOp::Sle,
        Cmp::Gt => CmpOp::Sgt,
        Cmp::Ge => CmpOp::Sge,
    }
}

impl Emitter for IrBuilder {
    type Value = VReg;
    type Block = BlockId;

    fn declare_extern(&mut self, name: &str, params: &[Ty], ret: Ty) {
        let mut func = Function::new(
            name,
            params
                .iter()
                .map(|&ty| (VReg(0), IrType::from_ty(ty)))
                .collect(),
            IrType::from_ty(ret),
        );
        func.is_external = true;
        self.module.functions.push(func);
    }

    fn define_global(&mut self, name: &str, ty: Ty) {
        self.module.globals.push(Global {
            name: name.to_string(),
            ty: IrType::from_ty(ty),
        });
    }

    fn start_function(&mut self, name: &str, params: &[(String, Ty)], ret: Ty) -> Vec<VReg> {
        self.end_function();

        let param_vregs: Vec<(VReg, IrType)> = params
            .iter()
            .map(|(_, ty)| (self.fresh_vreg(), IrType::from_ty(*ty)))
            .collect();
        let vregs: Vec<VReg> = param_vregs.iter().map(|(v, _)| *v).collect();

        self.current_fn = Some(Function::new(name, param_vregs, IrType::from_ty(ret)));

        let entry = self.fresh_block("entry");
        let label = self.label_of(entry);
        self.current_block = Some(BasicBlock::new(entry, label));

        vregs
    }

    fn finish_function(&mut self) {
        self.end_function();
    }

    fn create_block(&mut self, label: &str) -> BlockId {
        self.fresh_block(label)
    }

    fn start_block(&mut self, block: BlockId) {
        self.seal_block();
        let label = self.label_of(block);
        self.current_block = Some(BasicBlock::new(block, label));
    }

    fn block_terminated(&self) -> bool {
        self.current_block
            .as_ref()
            .map(|b| b.terminator.is_some())
            .unwrap_or(true)
    }

    fn const_int(&mut self, value: i64) -> VReg {
        self.emit_with_result(InstrKind::Const(Constant::Int(value)))
    }

    fn const_float(&mut self, value: f64) -> VReg {
        self.emit_with_result(InstrKind::Const(Constant::Float(value)))
    }

    fn const_bool(&mut self, value: bool) -> VReg {
        self.emit_with_result(InstrKind::Const(Constant::Bool(value)))
    }

    fn alloca(&mut self, name: &str, ty: Ty) -> VReg {
        self.emit_with_result(InstrKind::Alloca(IrType::from_ty(ty), name.to_string()))
    }

    fn load(&mut self, slot: VReg, _ty: Ty) -> VReg {
        self.emit_with_result(InstrKind::Load(slot))
    }

    fn store(&mut self, slot: VReg, value: VReg) {
        self.emit(None, InstrKind::Store(slot, value));
    }

    fn global_slot(&mut self, name: &str) -> VReg {
        self.emit_with_result(InstrKind::GlobalRef(name.to_string()))
    }

    fn int_binary(&mut self, op: ArithOp, lhs: VReg, rhs: VReg) -> VReg {
        let kind = match op {
            ArithOp::Add => InstrKind::Add(lhs, rhs),
            ArithOp::Sub => InstrKind::Sub(lhs, rhs),
            ArithOp::Mul => InstrKind::Mul(lhs, rhs),
            ArithOp::Div => InstrKind::SDiv(lhs, rhs),
            ArithOp::Rem => InstrKind::SRem(lhs, rhs),
        };
        self.emit_with_result(kind)
    }

    fn float_binary(&mut self, op: ArithOp, lhs: VReg, rhs: VReg) -> VReg {
        let kind = match op {
            ArithOp::Add => InstrKind::FAdd(lhs, rhs),
            ArithOp::Sub => InstrKind::FSub(lhs, rhs),
            ArithOp::Mul => InstrKind::FMul(lhs, rhs),
            ArithOp::Div => InstrKind::FDiv(lhs, rhs),
            ArithOp::Rem => InstrKind::FRem(lhs, rhs),
        };
        self.emit_with_result(kind)
    }

    fn int_cmp(&mut self, op: Cmp, lhs: VReg, rhs: VReg) -> VReg {
        self.emit_with_result(InstrKind::ICmp(cmp_op(op), lhs, rhs))
    }

    fn float_cmp(&mut self, op: Cmp, lhs: VReg, rhs: VReg) -> VReg {
        self.emit_with_result(InstrKind::FCmp(cmp_op(op), lhs, rhs))
    }

    fn neg(&mut self, value: VReg) -> VReg {
        self.emit_with_result(InstrKind::Neg(value))
    }

    fn fneg(&mut self, value: VReg) -> VReg {
        self.emit_with_result(InstrKind::FNeg(value))
    }

    fn not(&mut self, value: VReg) -> VReg {
        self.emit_with_result(InstrKind::Not(value))
    }

    fn int_to_float(&mut self, value: VReg) -> VReg {
        self.emit_with_result(InstrKind::SIToFP(value, IrType::F64))
    }

    fn bool_to_float(&mut self, value: VReg) -> VReg {
        self.emit_with_result(InstrKind::SIToFP(value, IrType::F64))
    }

    fn bool_to_int(&mut self, value: VReg) -> VReg {
        self.emit_with_result(InstrKind::ZExt(value, IrType::I32))
    }

    fn float_to_int(&mut self, value: VReg) -> VReg {
        self.emit_with_result(InstrKind::FPToSI(value, IrType::I32))
    }

    fn float_to_bool(&mut self, value: VReg) -> VReg {
        self.emit_with_result(InstrKind::FPToSI(value, IrType::I1))
    }

    fn int_to_bool(&mut self, value: VReg) -> VReg {
        self.emit_with_result(InstrKind::Trunc(value, IrType::I1))
    }

    fn call(&mut self, name: &str, args: &[VReg], ret: Ty) -> Option<VReg> {
        let kind = InstrKind::Call {
            func: name.to_string(),
            args: args.to_vec(),
        };
        if ret == Ty::Void {
            self.emit(None, kind);
            None
        } else {
            Some(self.emit_with_result(kind))
        }
    }

    fn ret(&mut self, value: Option<VReg>) {
        self.terminate(Terminator::Ret(value));
    }

    fn br(&mut self, target: BlockId) {
        self.terminate(Terminator::Br(target));
    }

    fn cond_br(&mut self, cond: VReg, then_block: BlockId, else_block: BlockId) {
        self.terminate(Terminator::CondBr {
            cond,
            then_block,
            else_block,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_a_function() {
        let mut b = IrBuilder::new("test");
        b.start_function("f", &[], Ty::Int);
        let v = b.const_int(1);
        b.ret(Some(v));
        b.finish_function();

        let module = b.finish();
        let f = module.function("f").unwrap();
        assert_eq!(f.ret_type, IrType::I32);
        assert_eq!(f.blocks.len(), 1);
        assert!(matches!(
            f.blocks[0].terminator,
            Some(Terminator::Ret(Some(_)))
        ));
    }

    #[test]
    fn test_terminator_is_not_overwritten() {
        let mut b = IrBuilder::new("test");
        b.start_function("f", &[], Ty::Void);
        b.ret(None);
        let dead = b.create_block("dead");
        b.br(dead);
        b.finish_function();

        let module = b.finish();
        let f = module.function("f").unwrap();
        assert!(matches!(f.blocks[0].terminator, Some(Terminator::Ret(None))));
    }

    #[test]
    fn test_terminated_block_accepts_no_instructions() {
        let mut b = IrBuilder::new("test");
        b.start_function("f", &[], Ty::Int);
        let v = b.const_int(1);
        b.ret(Some(v));
        b.const_int(2);
        b.finish_function();

        let module = b.finish();
        let f = module.function("f").unwrap();
        assert_eq!(f.blocks[0].instructions.len(), 1);
    }

    #[test]
    fn test_block_labels() {
        let mut b = IrBuilder::new("test");
        b.start_function("f", &[], Ty::Void);
        let body = b.create_block("while.body");
        b.br(body);
        b.start_block(body);
        b.ret(None);
        b.finish_function();

        let module = b.finish();
        let f = module.function("f").unwrap();
        assert_eq!(f.blocks[0].label, "entry");
        assert_eq!(f.blocks[1].label, "while.body");
    }

    #[test]
    fn test_extern_has_no_body() {
        let mut b = IrBuilder::new("test");
        b.declare_extern("print_int", &[Ty::Int], Ty::Void);
        let module = b.finish();
        let f = module.function("print_int").unwrap();
        assert!(f.is_external);
        assert!(f.blocks.is_empty());
    }
}
