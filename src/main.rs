use clap::{Parser, Subcommand};
use rand::rngs::OsRng;
use std::fs::File;
use std::io::BufReader;
use threshold_sim::bls::Bls12381;
use threshold_sim::{simulation, DomainTag, QuorumPlan, SimulationConfig, ThresholdParams};

#[derive(Parser)]
#[command(name = "threshold-sim")]
#[command(about = "Simulate an (n, m) threshold BLS multi-signature", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run key setup, signing and reconstruction over every quorum
    Simulate {
        /// JSON file with a SimulationConfig; flags below override it
        #[arg(short, long)]
        config: Option<String>,
        #[arg(short, long)]
        n: Option<u32>,
        #[arg(short, long)]
        m: Option<u32>,
        /// 8-byte domain tag as hex
        #[arg(short, long)]
        domain_tag: Option<DomainTag>,
        /// Message hash as hex
        #[arg(long)]
        message_hash: Option<String>,
        /// Sign-and-verify every exchanged shared key pair
        #[arg(long)]
        verify_shared_keys: bool,
    },
    /// Print the quorums, reconstruction coefficients and overall LCM
    Coefficients {
        #[arg(short, long, default_value = "7")]
        n: u32,
        #[arg(short, long, default_value = "3")]
        m: u32,
    },
}

fn load_config(path: Option<&str>) -> Result<SimulationConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let reader = BufReader::new(File::open(path)?);
            Ok(serde_json::from_reader(reader)?)
        }
        None => Ok(SimulationConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            config,
            n,
            m,
            domain_tag,
            message_hash,
            verify_shared_keys,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(n) = n {
                config.n = n;
            }
            if let Some(m) = m {
                config.m = m;
            }
            if let Some(tag) = domain_tag {
                config.domain_tag = tag;
            }
            if let Some(hash) = message_hash {
                config.message_hash = hex::decode(hash.trim_start_matches("0x"))?;
            }
            config.verify_shared_keys |= verify_shared_keys;

            let report = simulation::run::<Bls12381, _>(&config, &mut OsRng)?;
            serde_json::to_writer_pretty(std::io::stdout(), &report)?;
            println!();
        }
        Commands::Coefficients { n, m } => {
            let params = ThresholdParams::new(n, m)?;
            let plan = QuorumPlan::new(&params)?;
            serde_json::to_writer_pretty(std::io::stdout(), &plan)?;
            println!();
        }
    }

    Ok(())
}
