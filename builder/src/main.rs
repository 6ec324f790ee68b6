use maxmin::batch::BatchOrchestrator;
use maxmin::config::PickerConfig;
use maxmin::fingerprint::Similarity;
use maxmin::io::{SmilesSupplier, SmilesWriter};

use kdam::tqdm;
use log::{error, info};
use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
#[derive(Parser, Debug)] #[command(author, version, about, long_about = None)]
struct Args {

    //YAML config, defaults are used for anything it leaves out
    #[arg(short, long)]
    config: Option<PathBuf>,

    //SMILES store to read
    #[arg(short, long)]
    input: Option<PathBuf>,

    //File the picks are written to
    #[arg(short, long)]
    output: Option<PathBuf>,

    //Records per window
    #[arg(long)]
    pool_size: Option<usize>,

    //Picks per window
    #[arg(long)]
    pick_size: Option<usize>,

    //Number of windows
    #[arg(long)]
    num_iterations: Option<usize>,

    #[arg(long)]
    radius: Option<u32>,

    #[arg(long)]
    seed: Option<u64>,

    //dice or tanimoto
    #[arg(long)]
    metric: Option<Similarity>,

    //Write the effective config here and exit
    #[arg(long)]
    dump_config: Option<PathBuf>,
}

impl Args {

    fn into_config(self) -> Result<(PickerConfig, Option<PathBuf>), Box<dyn Error + Send + Sync>> {

        let mut config = match &self.config {
            Some(filename) => PickerConfig::from_file(filename)?,
            None => PickerConfig::default(),
        };

        if let Some(input) = self.input { config.input_path = input; }
        if let Some(output) = self.output { config.output_path = output; }
        if let Some(pool_size) = self.pool_size { config.pool_size = pool_size; }
        if let Some(pick_size) = self.pick_size { config.pick_size = pick_size; }
        if let Some(num_iterations) = self.num_iterations { config.num_iterations = num_iterations; }
        if let Some(radius) = self.radius { config.radius = radius; }
        if let Some(seed) = self.seed { config.seed = seed; }
        if let Some(metric) = self.metric { config.metric = metric; }

        Ok((config, self.dump_config))
    }
}

fn main() -> Result<(), Box<dyn Error + Send + Sync>> {

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    run(args).map_err(|e| {
        error!("{}", e);
        e
    })
}

fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {

    let (config, dump_config) = args.into_config()?;
    config.validate()?;

    if let Some(filename) = dump_config {
        config.to_file(&filename)?;
        info!("Wrote config to {}", filename.display());
        return Ok(());
    }

    info!(
        "Picking {} of every {} records over {} windows from {}",
        config.pick_size, config.pool_size, config.num_iterations, config.input_path.display()
    );

    let source = SmilesSupplier::open(&config.input_path, config.supplier.clone())?;
    let sink = SmilesWriter::create(&config.output_path, &config.writer)?;

    let mut orchestrator = BatchOrchestrator::new(&config, source, sink);

    for window in tqdm!(orchestrator.windows()) {
        orchestrator.process_window(window)?;
    }

    let stats = orchestrator.finish()?;

    println!("{}", stats);
    println!("Picks written to {}", config.output_path.display());

    Ok(())
}
