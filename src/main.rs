use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use typesynth::config::{AppConfig, FunctionRecord};
use typesynth::functions::ModuleRegistry;
use typesynth::SynthesisSession;

/// Search for expressions satisfying a function record's tests.
#[derive(Parser, Debug)]
#[command(name = "typesynth", version)]
struct Cli {
    /// Function record (.toml or .json) to search for
    function: PathBuf,

    /// Records exported as modules, registered in order
    #[arg(short, long = "module")]
    modules: Vec<PathBuf>,

    /// Settings file layered over the defaults
    #[arg(short, long, env = "TYPESYNTH_CONFIG")]
    config: Option<PathBuf>,

    /// Override the configured iteration count
    #[arg(short = 'n', long)]
    iterations: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    /// Generate and score candidates on all cores
    #[arg(long)]
    parallel: bool,

    /// Do not write the updated record back
    #[arg(long)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = AppConfig::layered(cli.config.as_deref()).context("loading settings")?;
    if let Some(iterations) = cli.iterations {
        config.search.iterations = iterations;
    }
    if cli.seed.is_some() {
        config.search.seed = cli.seed;
    }
    config.search.parallel |= cli.parallel;

    let mut registry = ModuleRegistry::new();
    for path in &cli.modules {
        let spec = FunctionRecord::load(path)
            .and_then(FunctionRecord::validate)
            .with_context(|| format!("loading module {}", path.display()))?;
        registry
            .register_record(&spec)
            .with_context(|| format!("registering module {}", path.display()))?;
    }

    let record = FunctionRecord::load(&cli.function)
        .with_context(|| format!("loading function {}", cli.function.display()))?;
    let iterations = config.search.iterations;
    let mut session = SynthesisSession::new(record, &registry, config.search)
        .with_context(|| format!("configuring {}", cli.function.display()))?;

    let stats = session.run(iterations)?;
    log::info!("{}", serde_json::to_string(&stats)?);

    println!("{}", serde_json::to_string_pretty(session.pools())?);

    if !cli.dry_run {
        session
            .into_record()
            .save(&cli.function)
            .with_context(|| format!("saving {}", cli.function.display()))?;
    }

    Ok(())
}
