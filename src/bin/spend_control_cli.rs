use std::process;

use spend_control::{cli::output, cli::run_cli, init};

fn main() {
    init();

    if let Err(err) = run_cli() {
        output::error(format!("Error: {err}"));
        process::exit(1);
    }
}
