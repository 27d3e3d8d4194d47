//! # Trackmix Play
//!
//! A command-line front end for the trackmix mixing engine.

use log::error;

mod args;
mod logging;
mod runner;

fn main() {
    let args = args::build_cli().get_matches();
    logging::init();

    let code = match runner::run(&args) {
        Ok(code) => code,
        Err(err) => {
            error!("{}", err.to_string().to_lowercase());
            -1
        }
    };

    std::process::exit(code)
}
