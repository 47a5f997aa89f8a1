use std::process::ExitCode;

fn main() -> ExitCode {
    oppscope_cli::run()
}
