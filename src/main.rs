use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use exprcalc::{bprintln, Color, UserFacing};

/// Evaluate an arithmetic expression over integers and `+ - * / **`
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Read the expression from a file
    #[arg(short, long, conflicts_with = "expression")]
    path: Option<PathBuf>,

    /// Print the fully parenthesized expression instead of its value
    #[arg(short, long)]
    tree: bool,

    /// The expression, multiple words are joined with spaces
    #[arg(allow_hyphen_values = true, trailing_var_arg = true)]
    expression: Vec<String>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let input = match &args.path {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(input) => input,
            Err(e) => {
                log::debug!("reading {}: {e}", path.display());
                bprintln!(Color::Red, "Error reading file: {}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None if args.expression.is_empty() => {
            bprintln!(Color::Red, "Missing an expression, see --help");
            return ExitCode::FAILURE;
        }
        None => args.expression.join(" "),
    };

    print_calc(&input, args.tree)
}

fn print_calc(input: &str, tree: bool) -> ExitCode {
    let output = if tree {
        exprcalc::parse_ast(input).map(|a| a.to_string())
    } else {
        exprcalc::parse(input).map(|v| v.to_string())
    };

    match output {
        Ok(o) => {
            println!("{o}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("{}\n", e.display(input));
            ExitCode::FAILURE
        }
    }
}
