/// Interface Width Resolver
///
/// Picks the narrow or wide target interface for a whole procedure. A wide
/// source always gets a wide target. A narrow source is promoted when any
/// integral parameter would be truncated by the narrow target type.
use crate::error::GenError;
use crate::model::{Procedure, Width};
use crate::tables::TypeWidths;
use tracing::{debug, warn};

pub fn resolve_width(
    procedure: &Procedure,
    source_width: Width,
    widths: &TypeWidths,
    strict_wide_descriptors: bool,
) -> Result<Width, GenError> {
    if source_width == Width::Wide {
        return Ok(Width::Wide);
    }

    let lookup = |parameter: &str, tag: &str| {
        widths.get(tag).ok_or_else(|| GenError::MissingWidth {
            procedure: procedure.name.clone(),
            parameter: parameter.to_string(),
            type_tag: tag.to_string(),
        })
    };

    let mut truncated = None;
    for param in procedure.parameters.iter().filter(|param| param.kind.is_integral()) {
        let source = lookup(&param.name, param.source.at(Width::Narrow))?;
        let target = lookup(&param.name, param.target.at(Width::Narrow))?;
        if target < source {
            truncated = Some((param, source, target));
            break;
        }
    }

    let Some((param, source, target)) = truncated else {
        return Ok(Width::Narrow);
    };
    debug!(
        procedure = %procedure.name,
        parameter = %param.name,
        source,
        target,
        "promoting to the wide interface"
    );

    for param in procedure.parameters.iter().filter(|param| param.kind.is_integral() && param.target.wide.is_none()) {
        if strict_wide_descriptors {
            return Err(GenError::MissingWideDescriptor {
                procedure: procedure.name.clone(),
                parameter: param.name.clone(),
            });
        }
        warn!(
            procedure = %procedure.name,
            parameter = %param.name,
            "no wide target descriptor; keeping the narrow type in a wide call"
        );
    }

    Ok(Width::Wide)
}
