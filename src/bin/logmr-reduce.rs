use std::path::PathBuf;

use clap::Parser;

use logmr::error::Error;
use logmr::logging::init_logging;
use logmr::map_reduce_apps::RequestCount;
use logmr::reducer::run_reduce;

/// Merge the keys of one leading-octet range from every intermediate artifact
#[derive(Parser, Debug)]
#[command(name = "logmr-reduce")]
struct Args {
    /// Directory of intermediate artifacts
    input_dir: PathBuf,

    /// Artifact to write
    output: PathBuf,

    /// First key of the range (inclusive)
    #[arg(allow_negative_numbers = true)]
    start: i64,

    /// End of the range (exclusive)
    #[arg(allow_negative_numbers = true)]
    end: i64,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn run(args: Args) -> anyhow::Result<()> {
    if args.start >= args.end {
        return Err(Error::Usage(format!(
            "invalid range [{}, {}): start must be below end",
            args.start, args.end
        ))
        .into());
    }
    run_reduce(&RequestCount, &args.input_dir, &args.output, args.start..args.end)?;
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("logmr-reduce: {:#}", e);
        std::process::exit(1);
    }
}
