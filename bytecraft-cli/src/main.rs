//! ByteCraft command-line driver.
//!
//! ```text
//! bytecraft asm input.asm -o output.bvm
//! bytecraft run program.bvm [--trace]
//! bytecraft dis program.bvm
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use bytecraft_assembler::assemble_file;
use bytecraft_disassembler::disassemble;
use bytecraft_runtime::{HaltSummary, Vm, VmConfig};
use bytecraft_spec::{flags, Module};

#[derive(Parser)]
#[command(name = "bytecraft", version, about = "ByteCraft assembler and virtual machine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble a source file into a BVM module
    Asm {
        /// Assembly source file
        input: PathBuf,
        /// Output .bvm file
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Load a BVM module and run it
    Run {
        /// Program file (.bvm)
        program: PathBuf,
        /// Print a diagnostic line after every instruction
        #[arg(long)]
        trace: bool,
    },
    /// Disassemble the code region of a BVM module
    Dis {
        /// Program file (.bvm)
        program: PathBuf,
    },
}

fn main() -> ExitCode {
    match dispatch(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn dispatch(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Asm { input, output } => {
            let module = assemble_file(&input)
                .with_context(|| format!("assembly of {} failed", input.display()))?;
            module
                .save_to_path(&output)
                .with_context(|| format!("cannot write {}", output.display()))?;
            println!(
                "Assembled OK: entry={} code={}B data={}B",
                module.entry_point,
                module.code.len(),
                module.data.len()
            );
            Ok(ExitCode::SUCCESS)
        }
        Commands::Run { program, trace } => {
            let module = Module::load_from_path(&program)
                .with_context(|| format!("cannot load {}", program.display()))?;
            let mut vm = Vm::new(
                module,
                VmConfig {
                    trace,
                    max_steps: None,
                },
            );
            let summary = vm.run();

            match summary.halt {
                HaltSummary::CleanExit => Ok(ExitCode::SUCCESS),
                _ => {
                    let rf = vm.state().flags();
                    eprintln!(
                        "vm halted on fault after {} steps: rF={rf:#010X} [{}]",
                        summary.steps,
                        flags::describe(rf)
                    );
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Dis { program } => {
            let module = Module::load_from_path(&program)
                .with_context(|| format!("cannot load {}", program.display()))?;
            for line in disassemble(&module.code)? {
                println!("{line}");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
