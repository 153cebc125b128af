use std::{env::var, process::ExitCode};

use jirasync::run;

fn main() -> ExitCode {
    if var("RUST_LOG").is_ok() {
        env_logger::init();
    }
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            eprintln!("error: {report}");
            ExitCode::FAILURE
        }
    }
}
