use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use reactor_sweep::config::{self, BindingConfig};
use reactor_sweep::{
    CoefficientProvider, CoefficientStore, JsonStore, KineticParameters, NativeBinding,
    ReactorError, Report, Result, SweepEngine, SweepOptions, table_rows,
};

#[derive(Parser)]
#[command(name = "reactor-sweep")]
#[command(about = "Reactor output-concentration sweeps over flow rate and inlet concentration", long_about = None)]
struct Cli {
    /// Coefficient store (JSON); created with default raw materials if missing
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List raw materials
    Materials,
    /// Show the coefficients of a raw material
    Show {
        name: String,
    },
    /// Add a raw material
    Add {
        name: String,
    },
    /// Store the coefficients of a raw material
    Set {
        name: String,
        #[command(flatten)]
        coefficients: CoefficientArgs,
    },
    /// Run a sweep with the native reactor model
    Sweep {
        name: String,
        /// Save a semicolon-delimited report to this file
        #[arg(short, long)]
        report: Option<PathBuf>,
        /// Evaluate grid points in parallel
        #[arg(long)]
        parallel: bool,
        /// Directory holding the reactor model library
        #[arg(long)]
        module_dir: Option<PathBuf>,
    },
}

#[derive(Args)]
struct CoefficientArgs {
    #[arg(long)]
    k1: f64,
    #[arg(long)]
    k2: f64,
    #[arg(long)]
    vr: f64,
    #[arg(long)]
    q_min: f64,
    #[arg(long)]
    q_max: f64,
    #[arg(long)]
    dq: f64,
    #[arg(long)]
    ca_in_min: f64,
    #[arg(long)]
    ca_in_max: f64,
    #[arg(long)]
    dca_in: f64,
}

impl From<CoefficientArgs> for KineticParameters {
    fn from(a: CoefficientArgs) -> Self {
        Self {
            k1: a.k1,
            k2: a.k2,
            vr: a.vr,
            q_min: a.q_min,
            q_max: a.q_max,
            dq: a.dq,
            ca_in_min: a.ca_in_min,
            ca_in_max: a.ca_in_max,
            d_ca_in: a.dca_in,
        }
    }
}

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            if let Some(hint) = e.hint() {
                eprintln!("hint: {hint}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let store_path = cli
        .store
        .unwrap_or_else(|| config::application_dir().join("reactor.json"));
    let mut store = JsonStore::open(store_path)?;

    match cli.command {
        Commands::Materials => cmd_materials(&store),
        Commands::Show { name } => cmd_show(&store, &name),
        Commands::Add { name } => {
            let id = store.add_raw_material(&name)?;
            println!("✓ Added {name} (id {id})");
            Ok(())
        }
        Commands::Set { name, coefficients } => {
            let params = KineticParameters::from(coefficients);
            params.validate()?;
            let id = lookup(&store, &name)?;
            store.set_coefficients(id, params)?;
            println!("✓ Coefficients of {name} updated");
            Ok(())
        }
        Commands::Sweep {
            name,
            report,
            parallel,
            module_dir,
        } => cmd_sweep(&store, &name, report.as_deref(), parallel, module_dir),
    }
}

fn lookup(store: &impl CoefficientProvider, name: &str) -> Result<u32> {
    store
        .find_by_name(name)
        .map(|m| m.id)
        .ok_or_else(|| ReactorError::RawMaterialNotFound(name.to_string()))
}

fn coefficients_of(store: &impl CoefficientProvider, name: &str) -> Result<KineticParameters> {
    let id = lookup(store, name)?;
    store.coefficients(id).ok_or_else(|| {
        ReactorError::Configuration(format!("no coefficients stored for {name}"))
    })
}

fn cmd_materials(store: &impl CoefficientProvider) -> Result<()> {
    let materials = store.raw_materials();
    if materials.is_empty() {
        println!("No raw materials");
    } else {
        for m in materials {
            let status = if store.coefficients(m.id).is_some() { "" } else { " (no coefficients)" };
            println!("  {} - {}{status}", m.id, m.name);
        }
    }
    Ok(())
}

fn cmd_show(store: &impl CoefficientProvider, name: &str) -> Result<()> {
    let params = coefficients_of(store, name)?;
    println!("{name}:\n{params}");
    Ok(())
}

fn cmd_sweep(
    store: &impl CoefficientProvider,
    name: &str,
    report: Option<&Path>,
    parallel: bool,
    module_dir: Option<PathBuf>,
) -> Result<()> {
    let params = coefficients_of(store, name)?;

    let mut cfg = BindingConfig::from_env();
    if let Some(dir) = module_dir {
        cfg.module_dir = dir;
    }
    let binding = NativeBinding::new(cfg);

    let opts = SweepOptions {
        parallel,
        cancel: None,
    };
    let result = SweepEngine::new(&binding).run_with(&params, &opts)?;

    println!("{:>10} {:>10} {:>12}", "Q", "CA_in", "CB");
    for row in table_rows(result.points()) {
        println!("{:>10} {:>10} {:>12}", row.q, row.ca_in, row.cb);
    }

    if let Some(series) = result.inlet_series().first() {
        println!("\nCB(Q) at CA_in = {}:", series.ca_in);
        for (q, cb) in &series.points {
            println!("  {q:>8.3}  {cb:.6}");
        }
    }
    println!("\n✓ Sweep completed, {} points", result.len());

    if let Some(path) = report {
        Report {
            raw_material: name,
            params: &params,
            points: result.points(),
        }
        .save(path)?;
        println!("✓ Report saved: {}", path.display());
    }
    Ok(())
}
