/// Aggregate prototype listing for every external name
use super::aliases::{canonical_name, BuildMode, EntryPoints};
use super::signature::Signature;
use crate::error::GenError;
use crate::model::{Procedure, Width};

pub const PROTOTYPES_FILE: &str = "prototypes_mpi_generated.h";

/// Every declared name of one interface; the long interface has only its canonical names.
pub fn prototype_names(procedure: &Procedure, width: Width) -> Vec<String> {
    let mut names = Vec::new();
    for build in [BuildMode::Primary, BuildMode::Shadow] {
        names.push(canonical_name(procedure, build, width));
        if width == Width::Narrow {
            names.extend(EntryPoints::for_procedure(procedure, build).names().map(String::from));
        }
    }
    names
}

pub fn procedure_prototypes(procedure: &Procedure) -> Result<Vec<String>, GenError> {
    let mut widths = vec![Width::Narrow];
    if procedure.has_long_interface() {
        widths.push(Width::Wide);
    }

    let mut out = Vec::new();
    for width in widths {
        let signature = Signature::for_procedure(procedure, width)?;
        for name in prototype_names(procedure, width) {
            out.push(format!("OMPI_DECLSPEC {} {}({});", signature.return_type, name, signature.parameters));
        }
    }
    Ok(out)
}

pub fn prototypes_header<'p>(procedures: impl IntoIterator<Item = &'p Procedure>) -> Result<String, GenError> {
    let mut text = String::new();
    for procedure in procedures {
        for line in procedure_prototypes(procedure)? {
            text.push_str(&line);
            text.push('\n');
        }
    }
    Ok(text)
}
