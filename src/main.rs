use std::env;
use std::process;

use swarm_catalog::cli;
use swarm_catalog::logging::init_logging;

fn main() {
    init_logging();
    let args: Vec<String> = env::args().collect();
    process::exit(cli::run_with_args(&args));
}
