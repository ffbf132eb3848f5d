use std::path::PathBuf;

use clap::Parser;

use logmr::logging::init_logging;
use logmr::map_reduce_apps::RequestCount;
use logmr::mapper::run_map;

/// Count requests per IP over a block of log files into one artifact
#[derive(Parser, Debug)]
#[command(name = "logmr-map")]
struct Args {
    /// Artifact to write
    output: PathBuf,

    /// Log files to read
    #[arg(required = true, num_args = 1..)]
    inputs: Vec<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run_map(&RequestCount, &args.output, &args.inputs) {
        eprintln!("logmr-map: {}", e);
        std::process::exit(1);
    }
}
