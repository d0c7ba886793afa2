use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{anyhow, Context};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use yaml2cli::config::{Labels, Options};
use yaml2cli::load;
use yaml2cli::store::ParameterStore;
use yaml2cli::Compiler;

/// Compile YAML command trees into addressed command-line scripts.
#[derive(Parser)]
#[command(
    name = "yaml2cli",
    version,
    about = "Compile YAML command trees into addressed command scripts"
)]
struct Cli {
    /// Output file; `-` writes to standard output
    #[arg(short, long, default_value = "-")]
    output: PathBuf,

    /// YAML file with placeholder parameters
    #[arg(short, long)]
    params: Option<PathBuf>,

    /// Override a parameter, e.g. `--set db.host=localhost` (repeatable)
    #[arg(short = 'D', long = "set", value_name = "KEY=VALUE")]
    overrides: Vec<String>,

    /// Key that marks a mapping as a command
    #[arg(long, default_value = "cmd")]
    cmd_key: String,

    /// Key holding a command's arguments
    #[arg(long, default_value = "args")]
    args_key: String,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Input YAML files, compiled in order
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(0) => {}
        Ok(failed) => {
            eprintln!("{} of {} file(s) failed", failed, cli.inputs.len());
            process::exit(1);
        }
        Err(err) => {
            eprintln!("{:#}", err);
            process::exit(1);
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Compile every input; returns how many failed.
fn run(cli: &Cli) -> anyhow::Result<usize> {
    let store = build_store(cli)?;
    let options = Options {
        labels: Labels {
            command: cli.cmd_key.clone(),
            arguments: cli.args_key.clone(),
        },
    };
    let compiler = Compiler::new(&store, &options);

    let mut out = open_output(&cli.output)?;
    let mut failed = 0;
    for input in &cli.inputs {
        debug!("Processing file: {}", input.display());
        match compile_file(&compiler, input) {
            Ok(script) => out
                .write_all(script.as_bytes())
                .context("Error writing output")?,
            Err(err) => {
                eprintln!("{}: {:#}", input.display(), err);
                failed += 1;
            }
        }
    }
    out.flush().context("Error writing output")?;
    Ok(failed)
}

fn build_store(cli: &Cli) -> anyhow::Result<ParameterStore> {
    let mut store = match &cli.params {
        Some(path) => load::load_params(path)?,
        None => ParameterStore::new(),
    };
    for pair in &cli.overrides {
        store.apply_override(pair)?;
    }
    Ok(store)
}

fn open_output(path: &Path) -> anyhow::Result<Box<dyn Write>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(BufWriter::new(io::stdout().lock())));
    }
    info!("Writing output to file: {}", path.display());
    let file = File::create(path)
        .with_context(|| format!("Cannot create output file {}", path.display()))?;
    Ok(Box::new(BufWriter::new(file)))
}

/// Each file is compiled completely before anything is written.
fn compile_file(compiler: &Compiler<'_>, path: &Path) -> anyhow::Result<String> {
    let document = load::load_document(path)?;
    compiler
        .compile(&document)
        .map_err(|err| anyhow!("{} ({})", err, err.code()))
}
