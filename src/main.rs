use std::process::ExitCode;

fn main() -> ExitCode {
    match sbs_rates::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err.message());
            ExitCode::from(err.exit_code())
        }
    }
}
