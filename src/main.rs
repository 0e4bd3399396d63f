//! Mini-C Compiler CLI
//!
//! The `mcc` command is the main entry point for the mini-C compiler.

use clap::{Parser, Subcommand};
use minic::{ir, lexer, parser};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mcc")]
#[command(version = minic::VERSION)]
#[command(about = "The mini-C compiler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a mini-C source file to textual IR
    Build {
        /// Input file to compile
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (defaults to the input with an .ir extension)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Emit tokens (for debugging)
        #[arg(long)]
        emit_tokens: bool,

        /// Emit AST (for debugging)
        #[arg(long)]
        emit_ast: bool,

        /// Print the IR to stdout as well
        #[arg(long)]
        emit_ir: bool,
    },

    /// Check a file for errors without writing output
    Check {
        /// Input file to check
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Tokenize a file and print tokens
    Tokenize {
        /// Input file to tokenize
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Parse a file and print AST
    Parse {
        /// Input file to parse
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
}

fn read_source(input: &PathBuf) -> miette::Result<String> {
    fs::read_to_string(input)
        .map_err(|e| miette::miette!("Failed to read {}: {}", input.display(), e))
}

fn module_name(input: &PathBuf) -> String {
    input
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            input,
            output,
            emit_tokens,
            emit_ast,
            emit_ir,
        } => {
            let source = read_source(&input)?;

            if emit_tokens {
                println!("=== Tokens ===");
                for token in lexer::lex(&source) {
                    println!("{:?} @ {} = {:?}", token.kind, token.pos, token.text(&source));
                }
            }

            if emit_ast {
                let program = parser::parse(&source)
                    .map_err(|e| miette::miette!("Parse error: {}", e))?;
                println!("=== AST ===");
                println!("{:#?}", program);
            }

            let (module, warnings) = minic::compile(&source, &module_name(&input))
                .map_err(|e| miette::miette!("{}", e))?;

            // Warnings come out only after compilation succeeds
            for warning in &warnings {
                eprintln!("{}", warning);
            }

            let text = ir::print_module(&module);
            if emit_ir {
                println!("{}", text);
            }

            let out_path = output.unwrap_or_else(|| input.with_extension("ir"));
            fs::write(&out_path, &text)
                .map_err(|e| miette::miette!("Failed to write {}: {}", out_path.display(), e))?;
            println!("Wrote {}", out_path.display());

            Ok(())
        }

        Commands::Check { input } => {
            let source = read_source(&input)?;

            let (_, warnings) = minic::compile(&source, &module_name(&input))
                .map_err(|e| miette::miette!("{}", e))?;

            for warning in &warnings {
                eprintln!("{}", warning);
            }
            println!("No errors found");
            Ok(())
        }

        Commands::Tokenize { input } => {
            let source = read_source(&input)?;

            for token in lexer::lex(&source) {
                println!(
                    "{:>4}..{:<4} {:8} {:20} {:?}",
                    token.span.start,
                    token.span.end,
                    token.pos.to_string(),
                    format!("{:?}", token.kind),
                    token.text(&source)
                );
            }
            Ok(())
        }

        Commands::Parse { input } => {
            let source = read_source(&input)?;

            let program =
                parser::parse(&source).map_err(|e| miette::miette!("Parse error: {}", e))?;
            println!("{:#?}", program);
            Ok(())
        }
    }
}
