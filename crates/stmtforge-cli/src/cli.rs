use std::path::PathBuf;

use stmtforge::Dialect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Compile,
    Dialects,
}

#[derive(Debug, Clone)]
pub enum Command {
    Help(HelpTopic),
    Compile(CompileArgs),
    Dialects,
}

#[derive(Debug, Clone)]
pub struct CompileArgs {
    pub file: PathBuf,
    /// Overrides the file's `dialect`.
    pub dialect: Option<Dialect>,
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1);
    let Some(first) = it.next() else {
        return Ok(Command::Help(HelpTopic::Root));
    };

    match first.as_str() {
        "-h" | "--help" => Ok(Command::Help(HelpTopic::Root)),
        "compile" => parse_compile(it.map(|s| s.as_str())),
        "dialects" => parse_dialects(it.map(|s| s.as_str())),
        _ => anyhow::bail!("unknown command: {first}"),
    }
}

fn parse_compile<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut file: Option<PathBuf> = None;
    let mut dialect: Option<Dialect> = None;

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Compile)),
            "--dialect" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--dialect requires a value");
                };
                dialect = Some(v.parse()?);
            }
            _ if token.starts_with("--dialect=") => {
                dialect = Some(token.trim_start_matches("--dialect=").parse()?);
            }
            _ if token.starts_with('-') => anyhow::bail!("unknown option: {token}"),
            _ if file.is_none() => file = Some(PathBuf::from(token)),
            _ => anyhow::bail!("unexpected argument: {token}"),
        }
    }

    Ok(Command::Compile(CompileArgs {
        file: file.unwrap_or_else(|| PathBuf::from("stmtforge.toml")),
        dialect,
    }))
}

fn parse_dialects<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    match it.next() {
        None => Ok(Command::Dialects),
        Some("-h" | "--help") => Ok(Command::Help(HelpTopic::Dialects)),
        Some(other) => anyhow::bail!("unexpected argument: {other}"),
    }
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
stmtforge - compile statement request files to dialect SQL

USAGE:
  stmtforge <COMMAND> [OPTIONS]

COMMANDS:
  compile       Compile every statement of a request file
  dialects      List the supported dialects and their settings

Run `stmtforge <command> --help` for more."
            );
        }
        HelpTopic::Compile => {
            println!(
                "\
USAGE:
  stmtforge compile [FILE] [OPTIONS]

ARGS:
  [FILE]                Request file (default: stmtforge.toml)

OPTIONS:
  --dialect <NAME>      Override the file's dialect
                        (sqlserver, postgresql, mysql, sqlite)
  -h, --help            Print help"
            );
        }
        HelpTopic::Dialects => {
            println!(
                "\
USAGE:
  stmtforge dialects

Prints each dialect's quoting, parameter prefix and capabilities."
            );
        }
    }
}
