//! # coolc
//!
//! This binary is the batch compiler for COOL. It combines parser, semantic
//! analysis, CIL lowering, and the MIPS backend into a single application;
//! the emitted assembly is concatenated with the fixed runtime library.
extern crate cool_lang;

mod cli;

use cli::*;

use std::{fs, process::exit};

use cool_lang::{
    cil::CoolToCil,
    mips::{MipsGenerator, RUNTIME},
    parser, semant,
};
use log::{error, info};

fn main() {
    let args = Cli::init();

    simple_logger::init_with_level((&args.verbosity).into()).unwrap();

    let Some(file) = args.file() else {
        error!("no input file given");
        exit(1);
    };

    let Ok(source) = fs::read_to_string(&file) else {
        println!("(0,0) - CompilerError: file {} not found", file.display());
        exit(1);
    };

    let program = match parser::parse(&source) {
        Ok(program) => program,
        Err(parse_error) => {
            println!("{parse_error}");
            exit(1);
        }
    };

    if args.dump_parsed {
        info!("Parsed AST:\n{program:#?}");
    }

    let analysis = match semant::analyze(&program) {
        Ok(analysis) => analysis,
        Err(diagnostics) => {
            for diagnostic in diagnostics {
                println!("{diagnostic}");
            }
            exit(1);
        }
    };

    if args.dump_typed {
        info!("Typed AST:\n{:#?}", analysis.program);
    }

    let cil = CoolToCil::new(&analysis.context).lower(&analysis.program);

    if args.dump_cil {
        info!("CIL program:\n{cil}");
    }

    let assembly = MipsGenerator::new(&cil).generate();

    let output = args.output.unwrap_or_else(|| file.with_extension("mips"));
    if let Err(io_error) = fs::write(&output, format!("{assembly}{RUNTIME}")) {
        error!("could not write '{}': {io_error}", output.display());
        exit(1);
    }

    info!("wrote {}", output.display());
}
