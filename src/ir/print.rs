//! Textual IR printer
//!
//! Renders a [`Module`] as human-readable text, one instruction per
//! line. The format is stable enough to diff in tests but is not a
//! parseable interchange format.

use super::types::Module;
use std::fmt::Write;

/// Render a module as text
pub fn print_module(module: &Module) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "; module {}", module.name);

    for global in &module.globals {
        let _ = writeln!(out, "global @{} : {}", global.name, global.ty);
    }
    if !module.globals.is_empty() {
        out.push('\n');
    }

    for func in &module.functions {
        if func.is_external {
            let _ = write!(out, "declare @{}(", func.name);
            for (i, (_, ty)) in func.params.iter().enumerate() {
                if i > 0 {
                    let _ = write!(out, ", ");
                }
                let _ = write!(out, "{}", ty);
            }
            let _ = writeln!(out, ") -> {}", func.ret_type);
            continue;
        }

        let _ = write!(out, "\nfn @{}(", func.name);
        for (i, (vreg, ty)) in func.params.iter().enumerate() {
            if i > 0 {
                let _ = write!(out, ", ");
            }
            let _ = write!(out, "{}: {}", vreg, ty);
        }
        let _ = writeln!(out, ") -> {} {{", func.ret_type);

        for block in &func.blocks {
            let _ = writeln!(out, "{} ({}):", block.id, block.label);
            for instr in &block.instructions {
                let _ = writeln!(out, "  {}", instr);
            }
            match &block.terminator {
                Some(term) => {
                    let _ = writeln!(out, "  {}", term);
                }
                None => {
                    let _ = writeln!(out, "  <no terminator>");
                }
            }
        }
        let _ = writeln!(out, "}}");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::super::emit::Emitter;
    use super::super::IrBuilder;
    use super::*;
    use crate::ty::Ty;

    #[test]
    fn test_print_simple_function() {
        let mut b = IrBuilder::new("m");
        b.start_function("main", &[], Ty::Int);
        let v = b.const_int(0);
        b.ret(Some(v));
        b.finish_function();

        let text = print_module(&b.finish());
        assert!(text.contains("; module m"));
        assert!(text.contains("fn @main() -> i32 {"));
        assert!(text.contains("%0 = const 0"));
        assert!(text.contains("ret %0"));
    }

    #[test]
    fn test_print_extern_and_global() {
        let mut b = IrBuilder::new("m");
        b.declare_extern("print_int", &[Ty::Int], Ty::Void);
        b.define_global("counter", Ty::Int);

        let text = print_module(&b.finish());
        assert!(text.contains("declare @print_int(i32) -> void"));
        assert!(text.contains("global @counter : i32"));
    }
}
