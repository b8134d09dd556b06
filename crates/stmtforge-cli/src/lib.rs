mod cli;
mod compile;
mod dialects;
mod request_file;

pub fn run(args: Vec<String>) -> anyhow::Result<()> {
    let cmd = cli::parse_args(&args)?;
    match cmd {
        cli::Command::Help(topic) => {
            cli::print_help(topic);
            Ok(())
        }
        cli::Command::Compile(args) => compile::run(args),
        cli::Command::Dialects => {
            dialects::run();
            Ok(())
        }
    }
}
