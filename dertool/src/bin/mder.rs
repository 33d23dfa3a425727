//! `mder`: build strict DER from a text spec plus string parameters.

use clap::Parser;
use dertext::Value;
use std::io::{Read, Write};
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "mder",
    about = "Build strict DER from a parenthesised text spec"
)]
struct Args {
    /// The text spec; `-` reads standard input.
    input: String,

    /// Where the DER goes; `-` writes standard output.
    output: String,

    /// String parameters bound to the spec's %0, %1, … slots.
    params: Vec<String>,
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("mder: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let spec = if args.input == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(&args.input)?
    };

    let params: Vec<Value> = args.params.into_iter().map(Value::Str).collect();
    let element = dertext::build(&spec, &params)?.ok_or("the spec built an absent object")?;
    let der = dertree::encode(&element)?;
    log::debug!("built {} bytes of DER", der.len());

    if args.output == "-" {
        std::io::stdout().write_all(&der)?;
    } else {
        std::fs::write(&args.output, &der)?;
    }

    Ok(())
}
