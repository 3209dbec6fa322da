//! CLI Module for cssnip
//! Parses the command line and runs either the web app or one of the terminal
//! commands that work directly on the snippet file.

pub mod commands;

use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;

use crate::config::{Config, ConfigError, ConfigOverrides};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Command {
    #[default]
    Serve,
    List,
    Show(u64),
    Export(PathBuf),
    Import(PathBuf),
    Backup(Option<PathBuf>),
    Help,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOptions {
    pub command: Command,
    pub overrides: ConfigOverrides,
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidFlag(message.into())
}

/// Parses arguments (without the program name). Flags may appear anywhere.
pub fn parse_args(args: &[String]) -> Result<CliOptions, ConfigError> {
    let mut overrides = ConfigOverrides::default();
    let mut positional: Vec<&str> = Vec::new();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| invalid(format!("{flag} needs a value")))
        };

        match arg.as_str() {
            "--config" => overrides.config_file = Some(PathBuf::from(value("--config")?)),
            "--data" => overrides.data_file = Some(PathBuf::from(value("--data")?)),
            "--bind" => overrides.bind = Some(value("--bind")?),
            "--port" => {
                let raw = value("--port")?;
                let port = raw
                    .parse()
                    .map_err(|_| invalid(format!("invalid port: {raw}")))?;
                overrides.port = Some(port);
            }
            "--durable-writes" => overrides.durable_writes = true,
            "-h" | "--help" => positional.insert(0, "help"),
            flag if flag.starts_with('-') => return Err(invalid(format!("unknown flag: {flag}"))),
            other => positional.push(other),
        }
    }

    let command = match positional.as_slice() {
        [] | ["serve"] => Command::Serve,
        ["help", ..] => Command::Help,
        ["list" | "ls"] => Command::List,
        ["show" | "view", id] => Command::Show(
            id.parse()
                .map_err(|_| invalid(format!("invalid snippet id: {id}")))?,
        ),
        ["export", path] => Command::Export(PathBuf::from(path)),
        ["import", path] => Command::Import(PathBuf::from(path)),
        ["backup"] => Command::Backup(None),
        ["backup", dir] => Command::Backup(Some(PathBuf::from(dir))),
        [command, ..] => return Err(invalid(format!("unknown or incomplete command: {command}"))),
    };

    Ok(CliOptions { command, overrides })
}

/// Runs the parsed command with the resolved configuration
pub fn execute(options: CliOptions) -> Result<()> {
    if options.command == Command::Help {
        print_help();
        return Ok(());
    }

    let config = Config::load(&options.overrides)?;

    match options.command {
        Command::Serve => commands::serve(&config),
        Command::List => commands::list_snippets(&config),
        Command::Show(id) => commands::show_snippet(&config, id),
        Command::Export(path) => commands::export_snippets(&config, &path),
        Command::Import(path) => commands::import_snippets(&config, &path),
        Command::Backup(dir) => commands::backup_snippets(&config, dir.as_deref()),
        Command::Help => Ok(()),
    }
}

/// Prints the help message with available commands
pub fn print_help() {
    println!(
        "{}  {}",
        "┃".bright_magenta(),
        "CSSNIP - CSS SNIPPET BOOK".bold()
    );

    println!("{}  {}", "┃".bright_magenta(), "USAGE:".bright_yellow());
    println!("{}  cssnip [OPTIONS] [COMMAND] [ARGS]", "┃".bright_magenta());
    println!("{}  {}", "┃".bright_magenta(), "COMMANDS:".bright_yellow());
    for (command, about) in [
        ("serve", "Run the web app (default)"),
        ("list, ls", "List all snippets"),
        ("show, view <ID>", "Display a snippet with highlighted CSS"),
        ("export <PATH>", "Write all snippets to an export file"),
        ("import <PATH>", "Add snippets from a JSON or YAML file"),
        ("backup [DIR]", "Copy the snippet file to a timestamped backup"),
        ("help", "Display this help message"),
    ] {
        println!(
            "{}  {:<27} {}",
            "┃".bright_magenta(),
            command.bright_white(),
            about
        );
    }

    println!("{}  {}", "┃".bright_magenta(), "OPTIONS:".bright_yellow());
    for (flag, about) in [
        ("--config <PATH>", "Config file (default: <config dir>/cssnip/config.toml)"),
        ("--data <PATH>", "Snippet file (default: snippets.json)"),
        ("--bind <ADDR>", "Address to listen on (default: 0.0.0.0)"),
        ("--port <PORT>", "Port to listen on (default: 5000)"),
        ("--durable-writes", "fsync every write of the snippet file"),
    ] {
        println!(
            "{}  {:<27} {}",
            "┃".bright_magenta(),
            flag.bright_white(),
            about
        );
    }
}
