//! CNAB 240 CLI
//!
//! Parses a remessa file against the built-in Itaú layouts and prints the
//! re-rendered content to stdout. Lenient rendering is used so partially
//! filled files stay inspectable (`?` marks missing values).
//!
//! # Usage
//!
//! ```bash
//! cargo run -- remessa.txt
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use cnab240::{layouts, CnabError, CnabReader, LayoutSet, Result};
use std::env;
use std::fs;
use std::process;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(CnabError::MissingArgument);
    }

    let input = fs::read_to_string(&args[1])?;

    let catalog = layouts::itau();
    let reader = CnabReader::new(&catalog, LayoutSet::itau());
    let file = reader.parse(&input)?;

    print!("{}", file.render(false)?);
    Ok(())
}
