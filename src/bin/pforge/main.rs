use std::process::ExitCode;

mod cli;
mod commands;
mod display;

fn main() -> ExitCode {
    let cli = cli::parse();

    match commands::dispatch(cli.command) {
        Ok(code) => code,
        Err(e) => {
            display::print_error(&e);
            ExitCode::FAILURE
        }
    }
}
