use clap::Parser;
use itp_core::{commands, logging, Cli, ExitCode};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            std::process::exit(ExitCode::for_clap_error(&err).as_i32());
        }
    };
    logging::init(cli.verbose, cli.log_json);
    let code = commands::run(&cli);
    std::process::exit(code.as_i32());
}
