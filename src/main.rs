use lox_lang::{
    config::Config,
    diagnostics,
    driver::{self, LoxError, EXIT_FATAL, EXIT_NO_INPUT, EXIT_STATIC_ERROR, EXIT_USAGE},
    language::{lexer, parser, printer},
    runtime::Interpreter,
};
use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process;

const USAGE: &str = "Usage: lox-lang [run|tokens|ast] <file.lox> | lox-lang repl";

fn main() {
    init_tracing();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            process::exit(EXIT_USAGE);
        }
    };

    let args: Vec<String> = env::args().skip(1).collect();
    match args.as_slice() {
        [] => repl(config),
        [command] if command == "repl" => repl(config),
        [command, path] => match command.as_str() {
            "run" => run_file(config, path, &read_source(path)),
            "tokens" => dump_tokens(path, &read_source(path)),
            "ast" => dump_ast(path, &read_source(path)),
            _ => usage(),
        },
        _ => usage(),
    }
}

fn usage() -> ! {
    eprintln!("{USAGE}");
    process::exit(EXIT_USAGE);
}

fn read_source(path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            diagnostics::report_io_error(Path::new(path), &err);
            process::exit(EXIT_NO_INPUT);
        }
    }
}

fn run_file(config: Config, path: &str, source: &str) {
    let mut interpreter = Interpreter::new(config);
    if let Err(err) = driver::run_source(&mut interpreter, source) {
        diagnostics::report(path, source, &err);
        process::exit(err.exit_code());
    }
}

fn dump_tokens(path: &str, source: &str) {
    match lexer::lex(source) {
        Ok(tokens) => {
            for token in tokens {
                println!("{token}");
            }
        }
        Err(errors) => {
            diagnostics::emit_syntax_errors(path, source, &errors);
            process::exit(EXIT_STATIC_ERROR);
        }
    }
}

fn dump_ast(path: &str, source: &str) {
    let parsed = lexer::lex(source).and_then(|tokens| parser::parse(&tokens));
    match parsed {
        Ok(program) => print!("{}", printer::print_program(&program)),
        Err(errors) => {
            diagnostics::emit_syntax_errors(path, source, &errors);
            process::exit(EXIT_STATIC_ERROR);
        }
    }
}

fn repl(config: Config) {
    let mut interpreter = Interpreter::new(config);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let Some(Ok(line)) = lines.next() else {
            break;
        };
        match driver::run_source(&mut interpreter, &line) {
            Ok(()) => {}
            Err(err @ LoxError::Fatal(_)) => {
                diagnostics::report_plain(&err);
                process::exit(EXIT_FATAL);
            }
            Err(err) => diagnostics::report_plain(&err),
        }
    }
}

/// Logging is opt-in through `RUST_LOG` and always goes to stderr.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}
