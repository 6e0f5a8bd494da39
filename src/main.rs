//! # Quire CLI
//!
//! Usage:
//!   quire document.json -o pages.json
//!   echo '{ ... }' | quire --pretty
//!   quire document.json --count

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "quire", version, about = "Lay out a JSON document into pages")]
struct Args {
    /// Document JSON. Reads stdin when omitted.
    input: Option<PathBuf>,

    /// Where to write the laid-out pages. Defaults to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only print the number of physical pages.
    #[arg(long)]
    count: bool,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("✗ {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let input = match &args.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let document = quire::Document::from_json(&input)?;

    if args.count {
        println!("{}", quire::virtual_page_count(&document)?);
        return Ok(());
    }

    let rendered = quire::render(&document)?;
    let json = if args.pretty {
        serde_json::to_string_pretty(&rendered)?
    } else {
        serde_json::to_string(&rendered)?
    };
    match &args.output {
        Some(path) => {
            fs::write(path, &json)?;
            eprintln!(
                "✓ Written {} pages to {}",
                rendered.page_count(),
                path.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}
