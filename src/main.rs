use clap::Parser;

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use decksh::{Interp, ShellRunner};

/// decksh compiles deck generation scripts into deck markup.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// decksh source file (default: standard input)
    path: Option<PathBuf>,

    /// output destination (default: standard output)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let src = match &args.path {
        Some(p) => match fs::read_to_string(p) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("{}: {e}", p.display());
                return ExitCode::from(1);
            }
        },
        None => {
            let mut s = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut s) {
                eprintln!("stdin: {e}");
                return ExitCode::from(1);
            }
            s
        }
    };

    let mut out: Box<dyn Write> = match &args.output {
        Some(p) => match fs::File::create(p) {
            Ok(f) => Box::new(io::BufWriter::new(f)),
            Err(e) => {
                eprintln!("{}: {e}", p.display());
                return ExitCode::from(2);
            }
        },
        None => Box::new(io::stdout().lock()),
    };

    let mut interp = Interp::new(Box::new(ShellRunner));
    if let Err(e) = interp.run(&src, &mut out) {
        eprintln!("output: {e}");
        return ExitCode::from(2);
    }
    if let Err(e) = out.flush() {
        eprintln!("output: {e}");
        return ExitCode::from(2);
    }

    let errors = interp.errors();
    for e in errors {
        eprintln!("{e}");
    }
    if errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(3)
    }
}
