/// CLI commands: generate units, show one, list prototypes, evaluate sizes
use crate::codegen::{generate_unit, prototypes_header, unit_file_name, AliasMode, PROTOTYPES_FILE};
use crate::compiler::{resolve_sizes, Generator, SampleArgs};
use crate::config::{build_generator, Overrides, PlatformConfig};
use crate::error::GenError;
use crate::model::{Procedure, SpecDatabase};
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Inputs and switches shared by every command
#[derive(Args, Debug, Clone)]
pub struct GenerationArgs {
    /// Specification database (JSON)
    #[arg(long, value_name = "JSON")]
    pub spec: PathBuf,

    /// Platform configuration (TOML)
    #[arg(long, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Configure-generated header to read type widths from
    #[arg(long, value_name = "H")]
    pub opal_config: Option<PathBuf>,

    /// How entry points reach the canonical function
    #[arg(long, value_enum, value_name = "MODE")]
    pub aliasing: Option<AliasMode>,

    /// Do not trust type widths; guard every integer conversion
    #[arg(long)]
    pub general_purpose: bool,

    /// Fail when a promoted call has an integer parameter with no wide type
    #[arg(long = "strict-wide")]
    pub strict_wide: bool,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub generation: GenerationArgs,

    /// Output directory, created if absent
    #[arg(long, value_name = "DIR")]
    pub out: PathBuf,

    /// Generate only these procedures
    #[arg(long, value_name = "NAME")]
    pub only: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    #[command(flatten)]
    pub generation: GenerationArgs,

    /// Procedure to print, eg `mpi_send` or `send`
    #[arg(value_name = "PROCEDURE")]
    pub procedure: String,
}

#[derive(Args, Debug)]
pub struct PrototypesArgs {
    #[command(flatten)]
    pub generation: GenerationArgs,

    /// Write the listing here instead of stdout
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SizesArgs {
    #[command(flatten)]
    pub generation: GenerationArgs,

    #[arg(value_name = "PROCEDURE")]
    pub procedure: String,

    /// Scalar argument value
    #[arg(long = "value", value_name = "NAME=N", value_parser = parse_scalar)]
    pub values: Vec<(String, i64)>,

    /// Array argument contents
    #[arg(long = "array", value_name = "NAME=N,N,...", value_parser = parse_array)]
    pub arrays: Vec<(String, Vec<i64>)>,

    /// Size of the communicator passed as NAME
    #[arg(long = "comm-size", value_name = "NAME=N", value_parser = parse_scalar)]
    pub comm_sizes: Vec<(String, i64)>,

    /// Topology dimension of the communicator passed as NAME
    #[arg(long = "cart-dim", value_name = "NAME=N", value_parser = parse_scalar)]
    pub cart_dims: Vec<(String, i64)>,
}

fn split_assignment(text: &str) -> Result<(String, &str), String> {
    let (name, value) = text.split_once('=').ok_or_else(|| format!("expected NAME=VALUE, got '{}'", text))?;
    if name.is_empty() {
        return Err(format!("missing name in '{}'", text));
    }
    Ok((name.to_uppercase(), value))
}

fn parse_scalar(text: &str) -> Result<(String, i64), String> {
    let (name, value) = split_assignment(text)?;
    let value = value.trim().parse::<i64>().map_err(|e| format!("bad value for {}: {}", name, e))?;
    Ok((name, value))
}

fn parse_array(text: &str) -> Result<(String, Vec<i64>), String> {
    let (name, values) = split_assignment(text)?;
    let values = values
        .split(',')
        .filter(|value| !value.trim().is_empty())
        .map(|value| value.trim().parse::<i64>().map_err(|e| format!("bad element for {}: {}", name, e)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((name, values))
}

/// A loaded database plus the generator configured for this run
pub struct Session {
    pub database: SpecDatabase,
    pub generator: Generator,
}

impl Session {
    pub fn open(args: &GenerationArgs) -> Result<Self, GenError> {
        let platform = match &args.config {
            Some(path) => PlatformConfig::load(path)?,
            None => PlatformConfig::default(),
        };
        let opal_config = match &args.opal_config {
            Some(path) => Some(fs::read_to_string(path).map_err(|e| GenError::io(path, e))?),
            None => None,
        };
        let overrides = Overrides {
            aliasing: args.aliasing,
            general_purpose: args.general_purpose,
            strict_wide_descriptors: args.strict_wide,
        };

        let generator = build_generator(opal_config.as_deref(), &platform, overrides)?;
        let database = SpecDatabase::load(&args.spec)?;
        Ok(Session { database, generator })
    }

    fn select(&self, names: &[String]) -> Result<Vec<&Procedure>, GenError> {
        if names.is_empty() {
            return Ok(self.database.procedures.iter().collect());
        }
        names.iter().map(|name| self.database.procedure(name)).collect()
    }
}

fn write_file(path: &Path, text: &str) -> Result<(), GenError> {
    fs::write(path, text).map_err(|e| GenError::io(path, e))
}

/// Write one unit per selected procedure plus the prototype listing.
/// Returns the number of units written.
pub fn generate(args: &GenerateArgs) -> Result<usize, GenError> {
    let session = Session::open(&args.generation)?;
    let procedures = session.select(&args.only)?;
    fs::create_dir_all(&args.out).map_err(|e| GenError::io(&args.out, e))?;

    for procedure in &procedures {
        let text = generate_unit(&session.generator, procedure)?;
        let path = args.out.join(unit_file_name(procedure));
        write_file(&path, &text)?;
        info!(procedure = %procedure.name, path = %path.display(), "wrote unit");
    }

    let header = prototypes_header(procedures.iter().copied())?;
    write_file(&args.out.join(PROTOTYPES_FILE), &header)?;
    Ok(procedures.len())
}

pub fn show(args: &ShowArgs) -> Result<String, GenError> {
    let session = Session::open(&args.generation)?;
    let procedure = session.database.procedure(&args.procedure)?;
    generate_unit(&session.generator, procedure)
}

/// The listing, or `None` when it went to a file.
pub fn prototypes(args: &PrototypesArgs) -> Result<Option<String>, GenError> {
    let session = Session::open(&args.generation)?;
    let header = prototypes_header(&session.database.procedures)?;
    match &args.out {
        Some(path) => {
            write_file(path, &header)?;
            info!(path = %path.display(), "wrote prototypes");
            Ok(None)
        }
        None => Ok(Some(header)),
    }
}

/// Resolved length of every sized parameter, one `NAME = N` line each.
pub fn sizes(args: &SizesArgs) -> Result<String, GenError> {
    let session = Session::open(&args.generation)?;
    let procedure = session.database.procedure(&args.procedure)?;
    let plan = resolve_sizes(procedure, &session.generator.sizes)?;

    let samples = SampleArgs {
        scalars: args.values.iter().cloned().collect(),
        arrays: args.arrays.iter().cloned().collect(),
        comm_sizes: args.comm_sizes.iter().cloned().collect(),
        cart_dims: args.cart_dims.iter().cloned().collect(),
    };
    let values = plan.evaluate(procedure, &samples)?;

    let mut text = String::new();
    for param in &procedure.parameters {
        if let Some(length) = values.lengths.get(&param.name) {
            text.push_str(&format!("{} = {}\n", param.name, length));
        }
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignments_parse() {
        assert_eq!(parse_scalar("n=3"), Ok(("N".to_string(), 3)));
        assert_eq!(parse_array("DEGREES=2,1,4"), Ok(("DEGREES".to_string(), vec![2, 1, 4])));
        assert_eq!(parse_array("EMPTY="), Ok(("EMPTY".to_string(), vec![])));
        assert!(parse_scalar("N").is_err());
        assert!(parse_scalar("=3").is_err());
        assert!(parse_array("A=1,x").is_err());
    }
}
