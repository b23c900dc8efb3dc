mod cli;
mod codegen;
mod compiler;
mod config;
mod error;
mod ir;
mod logging;
mod model;
mod tables;

use clap::{Parser, Subcommand};
use cli::{GenerateArgs, PrototypesArgs, ShowArgs, SizesArgs};
use error::GenError;
use std::error::Error;
use std::process::ExitCode;

/// Generates the mpif.h C bindings from the specification database
#[derive(Parser)]
#[command(name = "mpifh-gen")]
#[command(version)]
#[command(about = "Generates mpif.h C bindings from a specification database", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase verbosity (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only report errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Write one unit per procedure plus the prototype listing into a directory
    Generate(GenerateArgs),

    /// Print the unit of one procedure
    Show(ShowArgs),

    /// Print or write the aggregate prototype listing
    Prototypes(PrototypesArgs),

    /// Evaluate a procedure's array lengths against sample argument values
    Sizes(SizesArgs),
}

fn run(command: Command) -> Result<(), GenError> {
    match command {
        Command::Generate(args) => {
            let count = cli::generate(&args)?;
            println!("Generated {} units in '{}'", count, args.out.display());
        }
        Command::Show(args) => print!("{}", cli::show(&args)?),
        Command::Prototypes(args) => {
            if let Some(listing) = cli::prototypes(&args)? {
                print!("{}", listing);
            }
        }
        Command::Sizes(args) => print!("{}", cli::sizes(&args)?),
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            let mut source = err.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {}", cause);
                source = cause.source();
            }
            if err.is_lookup_failure() {
                eprintln!("  (add the missing entry to the lookup tables or the platform configuration)");
            }
            ExitCode::FAILURE
        }
    }
}
