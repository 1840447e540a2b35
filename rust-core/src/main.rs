use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use lattice_defects::config::SimulationConfig;
use lattice_defects::interfaces::Precision;
use lattice_defects::scalar::Scalar;
use lattice_defects::Simulation;
use log::info;
use num_complex::Complex;

#[derive(Parser)]
#[command(name = "lattice-defects")]
#[command(about = "Random structural defects on domain-decomposed lattices")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate disorder realizations
    Run {
        /// TOML configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Override the number of realizations
        #[arg(short, long)]
        realizations: Option<usize>,

        /// Override the random seed
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Validate a configuration without generating disorder
    Check {
        /// TOML configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    info!("Starting lattice-defects v{}", lattice_defects::VERSION);

    match cli.command {
        Commands::Run {
            config,
            realizations,
            seed,
        } => {
            let mut sim_config = load(&config)?;
            if let Some(realizations) = realizations {
                sim_config.simulation.realizations = realizations;
            }
            if let Some(seed) = seed {
                sim_config.simulation.seed = seed;
            }
            dispatch(&sim_config, true)
        }
        Commands::Check { config } => {
            let sim_config = load(&config)?;
            dispatch(&sim_config, false)
        }
    }
}

fn load(path: &Path) -> Result<SimulationConfig> {
    SimulationConfig::from_file(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

fn dispatch(config: &SimulationConfig, generate: bool) -> Result<()> {
    match (config.simulation.precision, config.simulation.complex) {
        (Precision::Single, false) => execute::<f32>(config, generate),
        (Precision::Double, false) => execute::<f64>(config, generate),
        (Precision::Single, true) => execute::<Complex<f32>>(config, generate),
        (Precision::Double, true) => execute::<Complex<f64>>(config, generate),
    }
}

fn execute<T: Scalar>(config: &SimulationConfig, generate: bool) -> Result<()> {
    let mut simulation =
        Simulation::<T>::from_config(config).context("Invalid simulation configuration")?;

    let lattice = simulation.lattice();
    println!(
        "lattice: {:?} cells, {} orbitals, {} domains of {} cells, {} tiles per domain",
        config.lattice.size,
        lattice.orbitals(),
        lattice.domain_count(),
        lattice.cells_per_domain(),
        lattice.tile_count()
    );
    if !generate {
        println!("configuration OK: {} defect types", config.defects.len());
        return Ok(());
    }

    for realization in 0..simulation.realizations() {
        let summary = simulation
            .generate(realization)
            .with_context(|| format!("Realization {realization} failed"))?;
        println!("{summary}");
    }
    Ok(())
}
