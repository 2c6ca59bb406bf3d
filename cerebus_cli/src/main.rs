mod ui;

use cerebus_core::utils::logging::init_logging;
use clap::Parser;
use crate::ui::cli;

fn main() {
    init_logging();
    let args = cli::Args::parse();
    if let Err(e) = cli::run_cli(args) {
        eprintln!("CLI error: {e:?}");
        std::process::exit(1);
    }
}
