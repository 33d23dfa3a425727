//! `dder`: pretty-print BER/DER objects as the parenthesised text
//! format.

use clap::Parser;
use dertext::PrintOptions;
use std::io::Read;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "dder",
    about = "Pretty-print BER/DER objects (raw, Base64 or PEM) as text"
)]
struct Args {
    /// Print OIDs numerically instead of by name.
    #[arg(short = 'n')]
    numeric: bool,

    /// Per-level indentation prefix, or "none" for single-line output.
    #[arg(short = 'i', value_name = "INDENT")]
    indent: Option<String>,

    /// Input files; `-` (or no files at all) reads standard input.
    files: Vec<String>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let options = PrintOptions {
        numeric_oid: args.numeric,
        indent: match args.indent {
            Some(word) if word == "none" => None,
            Some(prefix) => Some(prefix),
            None => Some("    ".to_string()),
        },
    };

    let files = if args.files.is_empty() {
        vec!["-".to_string()]
    } else {
        args.files
    };

    for file in &files {
        if let Err(err) = dump(file, &options) {
            eprintln!("dder: {}: {}", file, err);
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}

fn dump(path: &str, options: &PrintOptions) -> Result<(), Box<dyn std::error::Error>> {
    let input = read_input(path)?;
    log::debug!("read {} bytes from {}", input.len(), path);

    let ber = dertool::sniff::extract(&input).ok_or("no BER object found")?;
    let element = dertree::decode(&ber)?;
    println!("{}", dertext::print(&element, options)?);
    Ok(())
}

fn read_input(path: &str) -> std::io::Result<Vec<u8>> {
    if path == "-" {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read(path)
    }
}
