//! cssnip - CSS Snippet Book
//!
//! Runs the snippet web app by default; `cssnip help` lists the terminal commands.

use std::error::Error;

use cssnip::cli;

/// Application entry point
/// Installs error reporting and logging, then parses the command line and runs the
/// selected command. Invalid arguments print usage and exit with status 2.
fn main() -> Result<(), Box<dyn Error>> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match cli::parse_args(&args) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("cssnip: {err}");
            cli::print_help();
            std::process::exit(2);
        }
    };

    cli::execute(options)?;

    Ok(())
}
