//! RISC-V core and SoC parameter resolver CLI.
//!
//! This binary exposes the preset catalog from the command line. It provides:
//! 1. **Listing:** Presets (`list`) and registered parameter keys (`keys`).
//! 2. **Resolution:** A validated SoC parameter set as JSON (`resolve`).
//! 3. **Inspection:** One key (`get`) or every SoC-level key (`dump`) of a stack.
//!
//! Every resolving command accepts `--cores`, repeated `--set Key=value` and an `--overrides`
//! JSON file; overrides sit on top of the preset, with `--set` above the file.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use rvconfig_params::params::KeyRegistry;
use rvconfig_params::{
    ConfigStack, ParamError, build_stack, keys, overrides, presets, resolve_all,
};

#[derive(Parser, Debug)]
#[command(
    name = "rvconfig",
    author,
    version,
    about = "Resolve RISC-V core and SoC parameter presets",
    long_about = "Compose a named preset with optional overrides, resolve it and print the \
                  validated parameter set as JSON.\n\nExamples:\n  rvconfig list\n  \
                  rvconfig resolve minimal-l3-debug --cores 2\n  \
                  rvconfig get default L3CacheParamsOpt\n  \
                  rvconfig resolve default --set RobSize=128 --overrides tweaks.json"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the preset catalog.
    List,

    /// List every registered parameter key and its value type.
    Keys,

    /// Resolve and validate a preset, printing the SoC parameter set.
    Resolve(StackArgs),

    /// Resolve a single key of a preset.
    Get {
        #[command(flatten)]
        stack: StackArgs,

        /// Key name, e.g. `DCacheParamsOpt`.
        key: String,
    },

    /// Resolve every SoC-level key of a preset without validating.
    Dump(StackArgs),
}

#[derive(Args, Debug)]
struct StackArgs {
    /// Preset name (see `rvconfig list`).
    preset: String,

    /// Number of harts.
    #[arg(short, long, default_value_t = 1)]
    cores: usize,

    /// Override one key, e.g. `--set RobSize=128`. Values are JSON; bare words are strings.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    assignments: Vec<String>,

    /// JSON file of key overrides.
    #[arg(long, value_name = "FILE")]
    overrides: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Installs the log subscriber on stderr.
///
/// # Arguments
///
/// * `verbose` - Number of `-v` flags; used only when `RUST_LOG` is unset.
fn init_logging(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(command: Commands) -> Result<(), ParamError> {
    match command {
        Commands::List => {
            for preset in presets::catalog() {
                println!("{:<18} {}", preset.name, preset.description);
            }
            Ok(())
        }
        Commands::Keys => {
            for key in KeyRegistry::builtin()?.keys() {
                println!("{:<24} {}", key.name(), key.type_name());
            }
            Ok(())
        }
        Commands::Resolve(args) => {
            let stack = stack_from(&args)?;
            let soc = resolve_all(&stack)?;
            print_json(&soc)
        }
        Commands::Get { stack: args, key } => {
            let registry = KeyRegistry::builtin()?;
            let key = registry.require(&key)?;
            let stack = stack_from(&args)?;
            let value = stack.pass().get_erased(key)?;
            print_json(&key.encode(&value)?)
        }
        Commands::Dump(args) => {
            let stack = stack_from(&args)?;
            let view = stack.view(keys::SOC)?;
            print_json(&view.to_json()?)
        }
    }
}

/// Builds the preset stack with any overrides on top.
fn stack_from(args: &StackArgs) -> Result<ConfigStack, ParamError> {
    let registry = KeyRegistry::builtin()?;
    let stack = build_stack(&args.preset, args.cores)?;
    let stack = overrides::apply(
        stack,
        &registry,
        args.overrides.as_deref(),
        &args.assignments,
    )?;
    debug!(preset = %args.preset, cores = args.cores, "stack ready");
    Ok(stack)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), ParamError> {
    let text = serde_json::to_string_pretty(value).map_err(|source| ParamError::Decode {
        key: "output".to_string(),
        source,
    })?;
    println!("{text}");
    Ok(())
}
