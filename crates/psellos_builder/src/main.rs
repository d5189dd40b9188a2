use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use psellos_builder::{
    compile_dataset, load_dataset, run_smoke, verify_dist, BuildSettings, CompileInput,
};

const DEFAULT_LOG_FILTER: &str = "psellos_builder=info,psellos_core=info";

#[derive(Parser)]
#[command(
    name = "psellos-builder",
    version,
    about = "Validate and compile prosopographical datasets into static JSON artifacts."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a dataset into a dist directory
    Compile(CompileArgs),
    /// Verify an existing dist directory against its dataset
    Check(CheckArgs),
    /// Compile into a (temporary) dist directory and check the layer artifacts
    Smoke(SmokeArgs),
}

#[derive(Args)]
struct LayerArgs {
    /// Build settings file (psellos.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Name of the canonical layer (default: canon)
    #[arg(long, value_name = "NAME")]
    canon: Option<String>,

    /// Entries kept in each top-participant ranking (default: 20)
    #[arg(long, value_name = "N")]
    top_n: Option<usize>,
}

impl LayerArgs {
    fn settings(&self) -> Result<BuildSettings, String> {
        BuildSettings::from_file_and_cli(self.config.as_deref(), self.canon.clone(), self.top_n)
            .map_err(|err| err.to_string())
    }
}

#[derive(Args)]
struct CompileArgs {
    /// Path to the dataset JSON file
    input: PathBuf,

    /// Path to the psellos-spec schema; its file stem becomes the manifest spec_version
    #[arg(long, value_name = "PATH")]
    spec: Option<PathBuf>,

    /// Output directory for compiled artifacts
    #[arg(long, default_value = "dist", value_name = "DIR")]
    dist: PathBuf,

    /// Layer metadata document (default: layers_meta.json next to the dataset, if present)
    #[arg(long, value_name = "PATH")]
    layers_meta: Option<PathBuf>,

    /// Timestamp recorded in the manifest (RFC 3339); defaults to now
    #[arg(long, value_name = "TS")]
    generated_at: Option<String>,

    #[command(flatten)]
    layers: LayerArgs,
}

#[derive(Args)]
struct CheckArgs {
    /// Path to the dataset JSON file the dist was built from
    input: PathBuf,

    /// Dist directory to verify
    #[arg(long, value_name = "DIR")]
    dist: PathBuf,

    #[command(flatten)]
    layers: LayerArgs,
}

#[derive(Args)]
struct SmokeArgs {
    /// Path to the dataset JSON file
    input: PathBuf,

    /// Dist directory to write (default: a temporary directory)
    #[arg(long, value_name = "DIR")]
    dist: Option<PathBuf>,

    #[command(flatten)]
    layers: LayerArgs,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Compile(args) => run_compile(args),
        Commands::Check(args) => run_check(args),
        Commands::Smoke(args) => run_smoke_command(args),
    };
    if let Err(err) = result {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn run_compile(args: CompileArgs) -> Result<(), String> {
    let settings = args.layers.settings()?;
    let output = compile_dataset(&CompileInput {
        input: args.input,
        dist: args.dist.clone(),
        spec: args.spec,
        layers_meta: args.layers_meta,
        generated_at: args.generated_at,
        settings,
    })
    .map_err(|err| err.to_string())?;
    for warning in &output.warnings {
        eprintln!("Warning: {}", warning);
    }
    println!(
        "Compiled {} assertions across {} layers into {}",
        output.manifest.counts.assertions,
        output.manifest.counts.layers,
        args.dist.display()
    );
    Ok(())
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let config = args
        .layers
        .settings()?
        .layer_config()
        .map_err(|err| err.to_string())?;
    let dataset = load_dataset(&args.input).map_err(|err| err.to_string())?;
    let report = verify_dist(&args.dist, &dataset, &config).map_err(|err| err.to_string())?;
    println!(
        "Dist OK: {} assertions, {} layers ({}), {} layer comparisons",
        report.assertions,
        report.layers.len(),
        report.layers.join(", "),
        report.comparisons
    );
    Ok(())
}

fn run_smoke_command(args: SmokeArgs) -> Result<(), String> {
    let settings = args.layers.settings()?;
    let layers = run_smoke(&args.input, args.dist.as_deref(), &settings)
        .map_err(|err| err.to_string())?;
    println!("Smoke OK: layers {}", layers.join(", "));
    Ok(())
}
