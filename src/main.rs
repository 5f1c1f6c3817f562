mod bytecode;
mod frontend;
mod lang;
mod runtime;

use std::path::Path;
use std::{env, fs};

use tracing_subscriber::EnvFilter;

use crate::bytecode::compile_error::CompileError;
use crate::bytecode::container::BytecodeContainer;
use crate::bytecode::disasm::disassemble;
use crate::bytecode::generate::Generator;
use crate::frontend::lexer::Lexer;
use crate::frontend::token_dumper::TokenDumper;
use crate::lang::ast::Program;
use crate::runtime::Vm;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("NOODLE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let tokens_only = args.contains(&"--tokens".to_string());
    let no_color = args.contains(&"--no-color".to_string());
    let pretty = args.contains(&"--pretty".to_string());
    let compile = args.contains(&"--compile".to_string());
    let dis = args.contains(&"--dis".to_string());

    // first non-flag argument is the filename
    let filename = args
        .iter()
        .skip(1)
        .filter(|a| !a.starts_with('-'))
        .find(|a| Some(a.as_str()) != output_flag_value(&args));

    match filename {
        Some(filename) => {
            if tokens_only {
                dump_tokens(filename, no_color, pretty);
            } else if compile {
                compile_ast(filename, output_flag_value(&args));
            } else if dis {
                print_listing(filename);
            } else {
                run_container(filename);
            }
        }
        None => print_usage(),
    }
}

/// The argument following `-o`, if any.
fn output_flag_value(args: &[String]) -> Option<&str> {
    args.iter()
        .position(|a| a == "-o")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}

fn read_source(filename: &str) -> String {
    match fs::read_to_string(filename) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Failed to read '{}': {}", filename, e);
            std::process::exit(1);
        }
    }
}

fn dump_tokens(filename: &str, no_color: bool, pretty: bool) {
    let source = read_source(filename);
    let lexer = Lexer::new(&source, filename);
    let (tokens, errors) = lexer.tokenize();

    let mut dumper = TokenDumper::new();
    if no_color {
        dumper = dumper.no_color();
    }
    if pretty {
        dumper = dumper.pretty();
    }
    dumper.dump(&tokens);

    if !errors.is_empty() {
        for error in &errors {
            eprintln!("{}", error);
        }
        std::process::exit(1);
    }
}

fn compile_ast(filename: &str, output: Option<&str>) {
    let source = read_source(filename);
    let program = match Program::from_json(&source) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}", CompileError::invalid_ast(e));
            std::process::exit(1);
        }
    };

    let container = match Generator::new().generate(&program) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Compile error: {}", e);
            std::process::exit(1);
        }
    };

    match output {
        Some(path) => {
            if let Err(e) = container.save(Path::new(path)) {
                eprintln!("{}", e);
                std::process::exit(1);
            }
            println!(
                "Wrote {} ({} instructions, {} constants)",
                path,
                container.instructions.len(),
                container.constants.len()
            );
        }
        None => print!("{}", disassemble(&container)),
    }
}

fn load_container(filename: &str) -> BytecodeContainer {
    match BytecodeContainer::load(Path::new(filename)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn print_listing(filename: &str) {
    print!("{}", disassemble(&load_container(filename)));
}

fn run_container(filename: &str) {
    let vm = Vm::new(load_container(filename));
    match vm.execute() {
        Ok(exec) => {
            println!("{}", exec.result.repr());
            println!("Instructions executed: {}", exec.instructions_executed);
            println!("Max stack depth: {}", exec.max_stack_depth);
        }
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("NOODLE - Bytecode compiler and virtual machine");
    println!();
    println!("Usage:");
    println!("  noodle <file.nbc>                 Run a compiled program");
    println!("  noodle --tokens <file.nd>         Show tokens only");
    println!("  noodle --compile <ast.json> -o <file.nbc>");
    println!("                                    Compile an AST to bytecode");
    println!("  noodle --compile <ast.json>       Compile and print the listing");
    println!("  noodle --dis <file.nbc>           Disassemble a compiled program");
    println!();
    println!("Set NOODLE_LOG to control log verbosity (e.g. NOODLE_LOG=debug).");
}
