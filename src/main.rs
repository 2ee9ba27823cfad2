use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::{info, warn};
use std::path::PathBuf;

use motesim::campaign::{list_campaigns, load_campaign, resolve_campaign_path, Campaign};
use motesim::environment::{discover_platforms, BuildingBlockCatalog, Environment};
use motesim::orchestrator::{generate_campaign, validate_experiment};
use motesim::params::Defaults;

/// Scenario generator for randomized wireless sensor network simulations
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    shared: SharedArgs,
}

#[derive(Args, Debug)]
struct SharedArgs {
    /// YAML or JSON file overriding the built-in parameter defaults
    #[arg(long, global = true)]
    defaults: Option<PathBuf>,

    /// Directory holding campaign files
    #[arg(long, global = true, default_value = "campaigns")]
    campaign_dir: PathBuf,

    /// Simulator source tree; its platform/ subdirectories are the valid targets
    #[arg(long, global = true)]
    contiki: Option<PathBuf>,

    /// Additional valid target platform (repeatable)
    #[arg(long = "platform", global = true)]
    platforms: Vec<String>,

    /// Building-block catalog (JSON)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a campaign file filled with the defaults
    Prepare {
        /// Campaign name or path
        name: PathBuf,

        /// Name of the experiment inside the campaign
        #[arg(long, default_value = "default-experiment")]
        experiment: String,
    },
    /// Validate a campaign and report corrected parameters
    Validate {
        /// Campaign name or path
        campaign: PathBuf,
    },
    /// Generate the scenarios of every experiment in a campaign
    Generate {
        /// Campaign name or path
        campaign: PathBuf,

        /// Output directory for scenario files
        #[arg(short, long, default_value = "experiments")]
        output: PathBuf,

        /// Seed for reproducible topologies
        #[arg(long)]
        seed: Option<u64>,
    },
    /// List the valid campaign files
    List,
}

fn load_defaults(args: &SharedArgs) -> Result<Defaults> {
    match &args.defaults {
        Some(path) => Defaults::load(path),
        None => Ok(Defaults::default()),
    }
}

fn load_environment(args: &SharedArgs) -> Result<Environment> {
    let mut env = Environment::new().with_platforms(args.platforms.iter().cloned());

    if let Some(contiki) = &args.contiki {
        let platforms = discover_platforms(contiki)
            .wrap_err_with(|| format!("Failed to discover platforms in '{}'", contiki.display()))?;
        env = env.with_platforms(platforms);
    }
    if env.platforms().next().is_none() {
        warn!("No target platform known: every target will fall back to its default");
    }

    if let Some(path) = &args.catalog {
        let catalog = BuildingBlockCatalog::load(path)?;
        info!("Loaded {} building block(s) from {:?}", catalog.len(), path);
        env = env.with_catalog(catalog);
    }

    Ok(env)
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let cli = Cli::parse();

    // Initialize logging with default filter level of "info"
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let defaults = load_defaults(&cli.shared)?;

    match &cli.command {
        Command::Prepare { name, experiment } => {
            let path = resolve_campaign_path(name, &cli.shared.campaign_dir);
            Campaign::template(experiment, &defaults)?.save(&path)?;
        }
        Command::Validate { campaign } => {
            let env = load_environment(&cli.shared)?;
            let path = resolve_campaign_path(campaign, &cli.shared.campaign_dir);
            let campaign = load_campaign(&path)?;
            for (experiment, descriptor) in &campaign.experiments {
                let validation = validate_experiment(experiment, descriptor, &defaults, &env)?;
                info!(
                    "Experiment '{}': {} diagnostic(s), {} correction(s)",
                    experiment,
                    validation.diagnostics.len(),
                    validation.corrections().count()
                );
            }
        }
        Command::Generate { campaign, output, seed } => {
            let env = load_environment(&cli.shared)?;
            let path = resolve_campaign_path(campaign, &cli.shared.campaign_dir);
            let campaign = load_campaign(&path)?;
            let written = generate_campaign(&campaign, &defaults, &env, output, *seed)?;
            info!("Generated {} scenario(s) in {:?}", written.len(), output);
        }
        Command::List => {
            for name in list_campaigns(&cli.shared.campaign_dir)? {
                println!("{}", name);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["motesim", "generate", "flooding", "--seed", "42"]);

        match cli.command {
            Command::Generate { campaign, output, seed } => {
                assert_eq!(campaign, PathBuf::from("flooding"));
                assert_eq!(output, PathBuf::from("experiments"));
                assert_eq!(seed, Some(42));
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(cli.shared.campaign_dir, PathBuf::from("campaigns"));
    }

    #[test]
    fn test_global_environment_args() {
        let cli = Cli::parse_from([
            "motesim",
            "validate",
            "flooding.yaml",
            "--platform", "z1",
            "--platform", "sky",
            "--catalog", "blocks.json",
        ]);

        assert!(matches!(cli.command, Command::Validate { .. }));
        assert_eq!(cli.shared.platforms, vec!["z1".to_string(), "sky".to_string()]);
        assert_eq!(cli.shared.catalog, Some(PathBuf::from("blocks.json")));

        // the catalog file does not exist
        let err = load_environment(&cli.shared).unwrap_err();
        assert!(err.to_string().contains("blocks.json"));
    }
}
