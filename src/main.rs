use clap::Parser;
use tracing::debug;

use logmr::common::MapReduce;
use logmr::config::Cli;
use logmr::logging::init_logging;
use logmr::map_reduce_apps::RequestCount;
use logmr::map_reduce_seq::SequentialMapReduce;
use logmr::mr_process::coordinator::render_results;
use logmr::mr_process::ProcessMapReduce;

async fn run(cli: Cli) -> anyhow::Result<()> {
    let filter = init_logging(cli.verbose);
    let forward = (cli.verbose > 0 || std::env::var_os("RUST_LOG").is_some()).then_some(filter);

    let tables = if cli.sequential {
        SequentialMapReduce::new(&cli.input_dir, Box::new(RequestCount))
            .run()
            .await?
    } else {
        let config = cli.into_config(forward)?;
        debug!(?config, "run configuration");
        ProcessMapReduce::new(config, Box::new(RequestCount))
            .run()
            .await?
    };

    let stdout = std::io::stdout();
    render_results(&tables, &mut stdout.lock())?;
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("logmr: {:#}", e);
        std::process::exit(1);
    }
}
