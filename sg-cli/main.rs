use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use sg_cli::{PipelineConfig, PipelineResult};
use sg_core::Device;
use sg_superglue::SuperGlueConfig;
use sg_superpoint::SuperPointConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sg")]
#[command(about = "Manage SuperPoint/SuperGlue pipeline configurations")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a preset configuration (TOML, or JSON for a .json output)
    Init {
        /// Output file
        #[arg(short, long, default_value = "pipeline.toml")]
        output: PathBuf,

        #[arg(long, value_enum, default_value_t = Preset::Default)]
        preset: Preset,

        /// SuperPoint weights
        #[arg(long, default_value = "models/superpoint.pt")]
        superpoint_weights: PathBuf,

        /// SuperGlue weights
        #[arg(long, default_value = "models/superglue.pt")]
        superglue_weights: PathBuf,

        /// Explicit match threshold in [0, 1]
        #[arg(long)]
        match_threshold: Option<f32>,

        /// Compute device: cpu or cuda:N
        #[arg(long, default_value = "cpu")]
        device: Device,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Load, validate and summarize a configuration file
    Check {
        config: PathBuf,

        /// Also check that both weights files exist
        #[arg(long)]
        weights: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    Default,
    Sparse,
    Dense,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> PipelineResult<()> {
    match args.command {
        Command::Init {
            output,
            preset,
            superpoint_weights,
            superglue_weights,
            match_threshold,
            device,
            force,
        } => {
            if output.exists() && !force {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    format!("{} exists, pass --force to overwrite", output.display()),
                )
                .into());
            }

            let superpoint = match preset {
                Preset::Default => SuperPointConfig::new(superpoint_weights),
                Preset::Sparse => SuperPointConfig::sparse_preset(superpoint_weights),
                Preset::Dense => SuperPointConfig::dense_preset(superpoint_weights),
            };
            let mut superglue = SuperGlueConfig::new(superglue_weights);
            superglue.match_threshold = match_threshold;

            let config = PipelineConfig::new(superpoint, superglue).with_device(device);
            config.validate()?;
            config.save(&output)?;
            info!("wrote {}", output.display());
            println!("{}", config.summary());
        }
        Command::Check { config, weights } => {
            let loaded = PipelineConfig::load(&config)?;
            if weights {
                loaded.check_weights()?;
                info!("weights found");
            }
            println!("{}: ok", config.display());
            println!("{}", loaded.summary());
        }
    }
    Ok(())
}
