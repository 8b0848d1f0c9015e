use std::io::{BufRead, Write};

use clap::Parser;
use zelo::{
    error::{ParseError, RuntimeError},
    interpreter::evaluator::core::Interpreter,
};

/// zelo is a small dynamically-typed scripting language with classes,
/// closures, macros and a garbage collector.
#[derive(Parser, Debug)]
#[command(name = "zelo", about, long_about = None)]
struct Args {
    /// Check syntax (lex, expand macros, parse) without executing.
    #[arg(short, long)]
    check: bool,

    /// Treat the argument as source text and evaluate it.
    #[arg(short, long)]
    eval: bool,

    /// Print version information.
    #[arg(short = 'v', long = "version")]
    version: bool,

    /// Script file to run (or source text with --eval). Starts a REPL when
    /// omitted.
    contents: Option<String>,
}

fn main() {
    let args = Args::parse();

    if args.version {
        println!("zelo v{}", env!("CARGO_PKG_VERSION"));
        println!("A dynamic scripting language implementation");
        std::process::exit(0);
    }

    let status = match args.contents {
        None => run_repl(),
        Some(contents) if args.eval => eval_code(&contents),
        Some(contents) => run_file(&contents, args.check),
    };

    std::process::exit(status);
}

/// Runs a script file; with `check_only` the pipeline stops after parsing.
fn run_file(path: &str, check_only: bool) -> i32 {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("Error: could not read '{path}': {error}");
            return 1;
        },
    };

    if check_only {
        return match zelo::check_source(&source) {
            Ok(()) => {
                println!("Syntax check passed for {path}");
                0
            },
            Err(errors) => {
                for error in &errors {
                    report_parse_error(error);
                }
                1
            },
        };
    }

    match zelo::run_source(&source) {
        Ok(()) => 0,
        Err(error) => {
            report(error.as_ref());
            1
        },
    }
}

/// Evaluates one chunk of source text given on the command line.
fn eval_code(code: &str) -> i32 {
    match zelo::run_source(code) {
        Ok(()) => 0,
        Err(error) => {
            report(error.as_ref());
            1
        },
    }
}

/// The interactive loop: one persistent interpreter, line-at-a-time
/// evaluation, and the `exit`/`quit`/`help`/`clear` commands.
fn run_repl() -> i32 {
    println!("Zelo REPL v{} (Type 'exit' to quit, 'help' for help)",
             env!("CARGO_PKG_VERSION"));

    let mut interpreter = Interpreter::new();
    let stdin = std::io::stdin();

    loop {
        print!("> ");
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {},
        }
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        match line {
            "exit" | "quit" => break,
            "help" => {
                println!("REPL commands:");
                println!("  exit, quit  - Exit the REPL");
                println!("  help        - Show this help");
                println!("  clear       - Clear the screen");
                continue;
            },
            "clear" => {
                print!("\x1b[2J\x1b[1;1H");
                let _ = std::io::stdout().flush();
                continue;
            },
            _ => {},
        }

        if let Err(error) = zelo::run_with(&mut interpreter, line) {
            report(error.as_ref());
        }
    }

    0
}

/// Prints an error with its code name to stderr.
fn report(error: &(dyn std::error::Error + 'static)) {
    if let Some(runtime) = error.downcast_ref::<RuntimeError>() {
        eprintln!("Runtime error ({}): {runtime}", runtime.code_name());
    } else if let Some(parse) = error.downcast_ref::<ParseError>() {
        report_parse_error(parse);
    } else {
        eprintln!("Error: {error}");
    }
}

fn report_parse_error(error: &ParseError) {
    eprintln!("Syntax error ({}): {error}", error.code_name());
}
