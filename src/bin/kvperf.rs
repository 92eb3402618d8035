use std::path::PathBuf;
use std::process::exit;

use clap::Parser;
use log::{error, info};

use kvperf::{run_job, Properties, Result};

#[derive(Parser)]
#[command(name = "kvperf", version, about = "A key-value store benchmark")]
struct Cli {
    /// Work-plan properties file (JSON object of string values)
    #[arg(long, value_name = "FILE")]
    work_plan: PathBuf,

    /// Job properties file; repeat to run several jobs in sequence
    #[arg(long, value_name = "FILE", required = true)]
    job: Vec<PathBuf>,
}

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("{}", e);
        exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    info!("kvperf {}", env!("CARGO_PKG_VERSION"));

    let work_plan = Properties::from_file(&cli.work_plan)?;
    for path in &cli.job {
        let job = Properties::from_file(path)?;
        info!("Running job from {}", path.display());

        let report = run_job(&work_plan, &job)?;
        println!("{}", report);
    }

    Ok(())
}
