/// Per-procedure generation state
use super::width::resolve_width;
use crate::error::GenError;
use crate::model::{Parameter, Procedure, Width};
use crate::tables::{SizeTable, TypeWidths};
use serde::Deserialize;

/// Whether integral widths are trusted when deciding conversions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionMode {
    /// Widths are known; equal widths are passed through
    #[default]
    Sized,
    /// Widths are not trusted; every integral parameter is guarded
    GeneralPurpose,
}

/// Context maintained while emitting one procedure
/// Created fresh for each (procedure, source width) pair and dropped afterwards.
#[derive(Debug, Clone)]
pub struct GenerationContext<'a> {
    pub procedure: &'a Procedure,
    pub source_width: Width,
    pub target_width: Width,
    pub mode: ConversionMode,
    pub widths: &'a TypeWidths,
    pub sizes: &'a SizeTable,
}

impl<'a> GenerationContext<'a> {
    pub fn new(
        procedure: &'a Procedure,
        source_width: Width,
        widths: &'a TypeWidths,
        sizes: &'a SizeTable,
        mode: ConversionMode,
        strict_wide_descriptors: bool,
    ) -> Result<Self, GenError> {
        let target_width = resolve_width(procedure, source_width, widths, strict_wide_descriptors)?;
        Ok(Self { procedure, source_width, target_width, mode, widths, sizes })
    }

    pub fn source_tag<'p>(&self, param: &'p Parameter) -> &'p str {
        param.source.at(self.source_width)
    }

    pub fn target_tag<'p>(&self, param: &'p Parameter) -> &'p str {
        param.target.at(self.target_width)
    }

    pub fn width_of(&self, param: &Parameter, tag: &str) -> Result<u32, GenError> {
        self.widths.get(tag).ok_or_else(|| GenError::MissingWidth {
            procedure: self.procedure.name.clone(),
            parameter: param.name.clone(),
            type_tag: tag.to_string(),
        })
    }

    /// Name of the target-convention implementation, eg `MPI_Send_c`.
    pub fn target_call_name(&self) -> String {
        match self.target_width {
            Width::Narrow => format!("MPI_{}", self.procedure.capitalized_suffix()),
            Width::Wide => format!("MPI_{}_c", self.procedure.capitalized_suffix()),
        }
    }
}
