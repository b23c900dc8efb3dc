/// Platform configuration
///
/// Widths and generation switches come from, lowest precedence first: the
/// built-in tables, a configure-generated `opal_config.h`, a TOML platform
/// file, and the command line.
use crate::codegen::AliasMode;
use crate::compiler::{ConversionMode, GenerationOptions, Generator};
use crate::error::GenError;
use crate::tables::{SizeTable, TypeWidths};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

lazy_static! {
    static ref DEFINE: Regex = Regex::new(r"^\s*#define\s+(\w+)\s+([0-9]+)\s*$").expect("define pattern");
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationSection {
    pub aliasing: Option<AliasMode>,
    pub general_purpose: Option<bool>,
    pub strict_wide_descriptors: Option<bool>,
}

/// Contents of a TOML platform file; every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlatformConfig {
    /// Type tag -> width in bytes
    pub widths: BTreeMap<String, u32>,
    pub generation: GenerationSection,
    /// `PROCEDURE:PARAMETER` -> size formula
    pub sizes: BTreeMap<String, String>,
}

impl PlatformConfig {
    pub fn from_toml(text: &str) -> Result<Self, GenError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, GenError> {
        let text = fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
        Self::from_toml(&text)
    }
}

/// Flags given on the command line; they win over every file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overrides {
    pub aliasing: Option<AliasMode>,
    pub general_purpose: bool,
    pub strict_wide_descriptors: bool,
}

/// Apply every `#define MACRO <digits>` that names a known width macro.
/// Returns how many width entries changed.
pub fn scan_opal_config(text: &str, widths: &mut TypeWidths) -> usize {
    let mut touched = 0;
    for line in text.lines() {
        let Some(captures) = DEFINE.captures(line) else {
            continue;
        };
        let Ok(bytes) = captures[2].parse::<u32>() else {
            continue;
        };
        let applied = widths.apply_define(&captures[1], bytes);
        if applied > 0 {
            debug!(macro_name = &captures[1], bytes, "width from platform header");
        }
        touched += applied;
    }
    touched
}

/// Build the generator for this run from whatever configuration was supplied.
pub fn build_generator(
    opal_config: Option<&str>,
    platform: &PlatformConfig,
    overrides: Overrides,
) -> Result<Generator, GenError> {
    let mut widths = TypeWidths::default();
    if let Some(text) = opal_config {
        scan_opal_config(text, &mut widths);
    }
    for (tag, bytes) in &platform.widths {
        widths.set(tag, *bytes);
    }

    let mut sizes = SizeTable::builtin()?;
    sizes.extend(platform.sizes.iter().map(|(key, formula)| (key.as_str(), formula.as_str())))?;

    let generation = &platform.generation;
    let general_purpose = overrides.general_purpose || generation.general_purpose.unwrap_or(false);
    let options = GenerationOptions {
        aliasing: overrides.aliasing.or(generation.aliasing).unwrap_or_default(),
        mode: if general_purpose { ConversionMode::GeneralPurpose } else { ConversionMode::Sized },
        strict_wide_descriptors: overrides.strict_wide_descriptors
            || generation.strict_wide_descriptors.unwrap_or(false),
    };
    debug!(?options, size_formulas = sizes.len(), "generator configured");
    Ok(Generator::new(widths, sizes, options))
}
