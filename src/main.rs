extern crate csvlang;
use csvlang::{compile, syntax_tree, tokenize, CompileError};

use docopt::Docopt;
use std::io::Write;
use std::process::{exit, Command, Stdio};

const USAGE: &str = "
CSVLang compiler: turns a CSVLang script into a pandas program.

Usage:
  csvlang [--tokens | --ast] <file>
  csvlang --run [--python=<exe>] <file>
  csvlang (-h | --help)

Options:
  -h --help        Show this screen.
  --tokens         Print the scanned tokens instead of compiling.
  --ast            Print the syntax tree instead of compiling.
  --run            Compile, then hand the program to python.
  --python=<exe>   Python interpreter used by --run [default: python3].

Logging goes to stderr and is set with RUST_LOG, e.g. RUST_LOG=csvlang=debug.
";

fn fail(error: CompileError) -> ! {
    eprintln!("{}", error);
    exit(1)
}

fn run(program: &str, python: &str) -> std::io::Result<i32> {
    let mut child = Command::new(python).arg("-").stdin(Stdio::piped()).spawn()?;
    if let Some(stdin) = child.stdin.as_mut() {
        stdin.write_all(program.as_bytes())?;
    }
    let status = child.wait()?;
    Ok(status.code().unwrap_or(1))
}

fn main() {
    env_logger::init();
    let args = Docopt::new(USAGE)
        .and_then(|d| d.parse())
        .unwrap_or_else(|e| e.exit());

    let filename = args.get_str("<file>");
    let text = match std::fs::read_to_string(filename) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: could not read {}: {}", filename, e);
            exit(1)
        }
    };

    if args.get_bool("--tokens") {
        for token in tokenize(&text).unwrap_or_else(|e| fail(e)) {
            println!("{}", token);
        }
    } else if args.get_bool("--ast") {
        print!("{}", syntax_tree(&text).unwrap_or_else(|e| fail(e)));
    } else {
        let program = compile(&text).unwrap_or_else(|e| fail(e));
        if args.get_bool("--run") {
            let python = args.get_str("--python");
            match run(&program, python) {
                Ok(code) => exit(code),
                Err(e) => {
                    eprintln!("Error: could not run {}: {}", python, e);
                    exit(1)
                }
            }
        } else {
            print!("{}", program);
        }
    }
}
