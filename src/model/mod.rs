/// Specification model - procedures and their parameters as described by the standard
///
/// Everything in here is read-only once loaded. The generator never mutates a
/// Procedure; per-procedure working state lives in `compiler::GenerationContext`.
mod loader;

#[cfg(test)]
pub mod fixtures;

pub use loader::SpecDatabase;

use serde::Deserialize;
use std::fmt;

/// Prefix every logical procedure name carries, eg `mpi_` in `mpi_allgatherv`.
pub const NAMESPACE_PREFIX: &str = "mpi_";

/// Integer-width flavour of an interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    Narrow,
    Wide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    In,
    Out,
    #[serde(alias = "in_out")]
    Inout,
}

impl Direction {
    /// Does the callee read the caller's value?
    pub fn reads(self) -> bool {
        matches!(self, Direction::In | Direction::Inout)
    }

    /// Does the callee hand a value back to the caller?
    pub fn writes(self) -> bool {
        matches!(self, Direction::Out | Direction::Inout)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleCategory {
    Communicator,
    Datatype,
    Request,
    Window,
    File,
    Group,
    Info,
    Operation,
    Errhandler,
    Session,
    Message,
}

/// Semantic kind of a parameter
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Choice buffer, passed by address
    Buffer,
    Handle(HandleCategory),
    Integer,
    Logical,
    /// Element count of a transfer, integer-valued
    TransferCount,
    String,
    StringArray,
    StringArrayArray,
    Status,
    /// Procedure argument; carries the standard's function type name
    Callback(String),
    /// Opaque state, extra state and attribute values
    State,
}

impl ParamKind {
    /// Integer-valued kinds take part in width selection and width conversion.
    pub fn is_integral(&self) -> bool {
        matches!(self, ParamKind::Integer | ParamKind::Logical | ParamKind::TransferCount)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, ParamKind::String | ParamKind::StringArray | ParamKind::StringArrayArray)
    }

    pub fn handle_category(&self) -> Option<HandleCategory> {
        match self {
            ParamKind::Handle(category) => Some(*category),
            _ => None,
        }
    }
}

/// Declared dimensionality, parsed from the standard's Fortran spelling
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum Dimensions {
    #[default]
    Scalar,
    /// `(*)`
    Array,
    /// `(N, *)` with a literal inner extent, eg the 3-tuples of a rank range
    Fixed { inner: u32 },
    /// `(MPI_STATUS_SIZE)`
    Status,
    /// `(MPI_STATUS_SIZE, *)`
    StatusArray,
    /// Anything the planner has no policy for
    Other(String),
}

impl Dimensions {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return Dimensions::Scalar;
        }

        let Some(inner) = text.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) else {
            return Dimensions::Other(text.to_string());
        };
        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        match parts.as_slice() {
            ["*"] => Dimensions::Array,
            ["MPI_STATUS_SIZE"] => Dimensions::Status,
            ["MPI_STATUS_SIZE", "*"] => Dimensions::StatusArray,
            [extent, "*"] => match extent.parse::<u32>() {
                Ok(inner) if inner > 0 => Dimensions::Fixed { inner },
                _ => Dimensions::Other(text.to_string()),
            },
            _ => Dimensions::Other(text.to_string()),
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Dimensions::Scalar)
    }

    /// Array-shaped in the sense of needing an element count at the call site.
    pub fn needs_length(&self) -> bool {
        !matches!(self, Dimensions::Scalar | Dimensions::Status)
    }
}

impl From<String> for Dimensions {
    fn from(text: String) -> Self {
        Dimensions::parse(&text)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimensions::Scalar => write!(f, "scalar"),
            Dimensions::Array => write!(f, "(*)"),
            Dimensions::Fixed { inner } => write!(f, "({}, *)", inner),
            Dimensions::Status => write!(f, "(MPI_STATUS_SIZE)"),
            Dimensions::StatusArray => write!(f, "(MPI_STATUS_SIZE, *)"),
            Dimensions::Other(text) => write!(f, "{}", text),
        }
    }
}

/// A type tag at the narrow width and, when the standard defines one, the wide width.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TypePair {
    pub narrow: String,
    #[serde(default)]
    pub wide: Option<String>,
}

impl TypePair {
    pub fn narrow(tag: &str) -> Self {
        TypePair { narrow: tag.to_string(), wide: None }
    }

    #[cfg(test)]
    pub fn with_wide(narrow: &str, wide: &str) -> Self {
        TypePair { narrow: narrow.to_string(), wide: Some(wide.to_string()) }
    }

    /// Tag at `width`; a missing wide tag falls back to the narrow one.
    pub fn at(&self, width: Width) -> &str {
        match (width, &self.wide) {
            (Width::Wide, Some(wide)) => wide,
            _ => &self.narrow,
        }
    }
}

/// How the target-convention prototype declares the parameter, eg
/// `MPI_Request*` over base type `MPI_Request`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TargetDecl {
    #[serde(rename = "type")]
    pub ty: String,
    pub base_type: String,
}

impl TargetDecl {
    pub fn is_pointer_to_base(&self) -> bool {
        self.ty.replace(' ', "") == format!("{}*", self.base_type.replace(' ', ""))
    }

    pub fn is_base(&self) -> bool {
        self.ty.trim() == self.base_type.trim()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub kind: ParamKind,
    pub direction: Direction,
    #[serde(default)]
    pub dimensions: Dimensions,
    pub source: TypePair,
    pub target: TypePair,
    /// Absent for the error-code parameter, which has no target counterpart.
    #[serde(default)]
    pub call: Option<TargetDecl>,
}

impl Parameter {
    pub fn is_error_code(&self) -> bool {
        self.name.eq_ignore_ascii_case("ierror")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Procedure {
    /// Logical name, eg `mpi_allgatherv`
    pub name: String,
    pub parameters: Vec<Parameter>,
    /// Source-convention return type for the few procedures that return a value
    #[serde(default)]
    pub return_kind: Option<String>,
}

impl Procedure {
    /// Name without its namespace prefix, eg `allgatherv`.
    pub fn suffix(&self) -> &str {
        self.name.strip_prefix(NAMESPACE_PREFIX).unwrap_or(&self.name)
    }

    /// Upper-cased name with its namespace prefix, eg `MPI_ALLGATHERV`.
    pub fn upper_name(&self) -> String {
        format!("MPI_{}", self.suffix().to_uppercase())
    }

    /// First letter upper, rest lower, eg `Dist_graph_create`.
    pub fn capitalized_suffix(&self) -> String {
        let lower = self.suffix().to_lowercase();
        let mut chars = lower.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.parameters.iter().position(|param| param.name == name)
    }

    /// A long (wide-source) interface exists when any parameter has a wide source tag.
    pub fn has_long_interface(&self) -> bool {
        self.parameters.iter().any(|param| param.source.wide.is_some())
    }

    pub fn has_handle_of(&self, categories: &[HandleCategory]) -> bool {
        self.parameters
            .iter()
            .filter_map(|param| param.kind.handle_category())
            .any(|category| categories.contains(&category))
    }
}
