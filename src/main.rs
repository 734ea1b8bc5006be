use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    match accuvote_convert::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
