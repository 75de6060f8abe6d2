//! CLI entry point: REPL when invoked with no arguments, script runner
//! when given a file path.
//!
//! Grounded on the teacher's `main.rs` for the `clap` derive shape and
//! the `rustyline::Editor` REPL loop; trimmed of the sandbox/stdlib-
//! module machinery (no filesystem/network sandbox, a single bundled
//! prelude instead of several stdlib modules) and of the help system.

use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};

use schemecore::config::{VERSION, WELCOME_FOOTER, WELCOME_MESSAGE, WELCOME_SUBTITLE};
use schemecore::env::Environment;
use schemecore::error::EvalError;
use schemecore::highlighter::LispHelper;
use schemecore::macros::MacroTable;
use schemecore::{eval_form, new_global_environment, PRELUDE_SOURCE};

/// A minimal Scheme-flavored Lisp interpreter core.
#[derive(Parser, Debug)]
#[command(name = "schemecore")]
#[command(version = VERSION)]
#[command(about = "A minimal Scheme-flavored Lisp interpreter core")]
struct CliArgs {
    /// Script file to execute. Starts the REPL if omitted.
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,

    /// Skip loading the bundled prelude library.
    #[arg(long = "no-prelude")]
    no_prelude: bool,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let env = new_global_environment();
    let macros = MacroTable::new();

    if !args.no_prelude {
        if let Err(e) = load_prelude(&env, &macros) {
            eprintln!("error: failed to load prelude: {}", e);
            return ExitCode::FAILURE;
        }
    }

    match args.script {
        Some(path) => run_script(&path, &env, &macros),
        None => {
            run_repl(&env, &macros);
            ExitCode::SUCCESS
        }
    }
}

/// Loads the bundled prelude into `env`. Its own forms are trusted;
/// a prelude failure is a build defect, not a user error, but it is
/// still surfaced rather than panicking.
fn load_prelude(env: &Rc<Environment>, macros: &MacroTable) -> Result<(), EvalError> {
    let forms = schemecore::parser::parse_all(PRELUDE_SOURCE)?;
    for form in &forms {
        eval_form(form, env, macros)?;
    }
    Ok(())
}

/// Executes a script file top-level form by top-level form, aborting
/// on the first error and exiting non-zero.
fn run_script(path: &PathBuf, env: &Rc<Environment>, macros: &MacroTable) -> ExitCode {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: cannot read {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let forms = match schemecore::parser::parse_all(&contents) {
        Ok(forms) => forms,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for form in &forms {
        if let Err(e) = eval_form(form, env, macros) {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}

const HISTORY_FILE: &str = ".schemecore_history";

/// Interactive loop: read one line, parse every top-level form it
/// contains, expand/analyze/evaluate/print each in turn, loop until
/// EOF. Errors abort only the current form; prior bindings persist.
fn run_repl(env: &Rc<Environment>, macros: &MacroTable) {
    let config = Config::builder().auto_add_history(true).build();
    let mut rl = match Editor::with_config(config) {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("error: failed to initialize REPL: {}", e);
            return;
        }
    };
    rl.set_helper(Some(LispHelper::new()));
    let _ = rl.load_history(HISTORY_FILE);

    println!("{}", WELCOME_MESSAGE);
    println!("{}", WELCOME_SUBTITLE);
    println!("{}", WELCOME_FOOTER);

    loop {
        match rl.readline("lisp> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                match trimmed {
                    "(quit)" | "(exit)" => {
                        println!("Goodbye!");
                        break;
                    }
                    "(clear)" => {
                        print!("\x1B[2J\x1B[H");
                        continue;
                    }
                    _ => {}
                }
                eval_and_print_line(&line, env, macros);
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(e) => {
                eprintln!("error: {}", e);
                break;
            }
        }
    }

    let _ = rl.save_history(HISTORY_FILE);
}

fn eval_and_print_line(line: &str, env: &Rc<Environment>, macros: &MacroTable) {
    let forms = match schemecore::parser::parse_all(line) {
        Ok(forms) => forms,
        Err(e) => {
            eprintln!("error: {}", e);
            return;
        }
    };
    for form in &forms {
        match eval_form(form, env, macros) {
            Ok(value) => println!("=> {}", value),
            Err(e) => {
                eprintln!("error: {}", e);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_prelude_defines_supplemental_functions() {
        let env = new_global_environment();
        let macros = MacroTable::new();
        load_prelude(&env, &macros).unwrap();
        assert!(env.get("not").is_some());
        assert!(env.get("map").is_some());
    }

    #[test]
    fn test_eval_and_print_line_reports_error_without_panicking() {
        let env = new_global_environment();
        let macros = MacroTable::new();
        // Unbound variable: should print an error, not panic.
        eval_and_print_line("undefined-name", &env, &macros);
    }

    #[test]
    fn test_cli_args_parses_script_and_no_prelude() {
        let args = CliArgs::parse_from(["schemecore", "--no-prelude", "run.lisp"]);
        assert!(args.no_prelude);
        assert_eq!(args.script, Some(PathBuf::from("run.lisp")));
    }

    #[test]
    fn test_run_script_executes_multiple_forms() {
        let path = write_tempfile("(define x 1) (define y 2)");
        let env = new_global_environment();
        let macros = MacroTable::new();
        run_script(&path, &env, &macros);
        assert!(env.get("x").is_some());
        assert!(env.get("y").is_some());
        let _ = std::fs::remove_file(&path);
    }

    fn write_tempfile(content: &str) -> PathBuf {
        use std::io::Write;
        let mut path = std::env::temp_dir();
        path.push(format!("schemecore-test-{}-{}.lisp", std::process::id(), content.len()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }
}
