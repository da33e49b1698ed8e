//! `cartograph` binary

use std::process::ExitCode;

fn main() -> ExitCode {
    let matches = carto_cli::command().get_matches();
    carto_cli::init_logging(matches.get_flag("log-json"));

    match carto_cli::run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(e.exit_code())
        }
    }
}
