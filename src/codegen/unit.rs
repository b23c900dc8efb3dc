/// Unit Emitter - one C translation unit per procedure
use super::aliases::{alias_block, canonical_name, BuildMode};
use super::render::render_function;
use super::signature::Signature;
use crate::compiler::{compile_body, Generator};
use crate::error::GenError;
use crate::ir::CFunction;
use crate::model::{HandleCategory, Procedure, Width};
use crate::tables::{is_body_by_hand, is_func_name_exempt};

const INCLUDES: [&str; 3] = [
    "ompi_config.h",
    "ompi/mpi/fortran/mpif-h/bindings.h",
    "ompi/mpi/fortran/base/constants.h",
];

/// Handles that carry their own name for error reporting.
const SELF_NAMING_HANDLES: [HandleCategory; 3] = [HandleCategory::Communicator, HandleCategory::Window, HandleCategory::File];

pub fn unit_file_name(procedure: &Procedure) -> String {
    format!("{}_f.c", procedure.suffix())
}

/// The `FUNC_NAME` declaration, if this procedure gets one.
pub fn func_name_line(procedure: &Procedure) -> Option<String> {
    if is_func_name_exempt(procedure) || procedure.has_handle_of(&SELF_NAMING_HANDLES) {
        return None;
    }
    Some(format!("static const char FUNC_NAME[] = \"{}\";", procedure.upper_name()))
}

fn compile_function(generator: &Generator, procedure: &Procedure, width: Width) -> Result<String, GenError> {
    let ctx = generator.context(procedure, width)?;
    let body = compile_body(&ctx)?;
    let signature = Signature::for_procedure(procedure, width)?;
    let function = CFunction {
        return_type: signature.return_type,
        name: canonical_name(procedure, BuildMode::Primary, width),
        parameters: signature.parameters,
        body,
    };
    Ok(render_function(&function))
}

/// Emit the full text of a procedure's unit.
pub fn generate_unit(generator: &Generator, procedure: &Procedure) -> Result<String, GenError> {
    let signature = Signature::for_procedure(procedure, Width::Narrow)?;
    let mut lines: Vec<String> = INCLUDES.iter().map(|header| format!("#include \"{}\"", header)).collect();
    lines.push(String::new());
    lines.extend(alias_block(procedure, &signature, generator.options.aliasing));
    lines.extend(func_name_line(procedure));

    let mut text = lines.join("\n");
    text.push('\n');

    if is_body_by_hand(procedure) {
        text.push_str(&format!("\n#include \"byhand_{}_f.c\"\n", procedure.suffix()));
        return Ok(text);
    }

    text.push_str(&compile_function(generator, procedure, Width::Narrow)?);
    if procedure.has_long_interface() {
        text.push_str(&compile_function(generator, procedure, Width::Wide)?);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::GenerationOptions;
    use crate::model::{fixtures, Direction};
    use crate::tables::{SizeTable, TypeWidths};

    fn generator() -> Generator {
        Generator::new(TypeWidths::default(), SizeTable::builtin().unwrap(), GenerationOptions::default())
    }

    #[test]
    fn communicator_and_window_suppress_func_name() {
        let procedure = fixtures::procedure(
            "mpi_win_create_like",
            vec![
                fixtures::handle("COMM", HandleCategory::Communicator, Direction::In),
                fixtures::handle("WIN", HandleCategory::Window, Direction::Out),
                fixtures::ierror(),
            ],
        );
        assert_eq!(func_name_line(&procedure), None);
        assert!(!generate_unit(&generator(), &procedure).unwrap().contains("FUNC_NAME"));
    }

    #[test]
    fn plain_procedures_name_themselves() {
        let procedure = fixtures::group_range_incl();
        assert_eq!(
            func_name_line(&procedure).as_deref(),
            Some("static const char FUNC_NAME[] = \"MPI_GROUP_RANGE_INCL\";")
        );
    }

    #[test]
    fn exempt_procedures_have_no_func_name() {
        let procedure = fixtures::procedure("mpi_type_create_keyval", vec![fixtures::ierror()]);
        assert_eq!(func_name_line(&procedure), None);
    }

    #[test]
    fn by_hand_units_stop_after_the_prologue() {
        let procedure = fixtures::procedure("mpi_attr_get", vec![fixtures::integer("KEYVAL", Direction::In), fixtures::ierror()]);
        let text = generate_unit(&generator(), &procedure).unwrap();
        assert!(text.ends_with("\n#include \"byhand_attr_get_f.c\"\n"));
        assert!(!text.contains("ompi_attr_get_f("));
        assert!(text.contains("#define ompi_attr_get_f pompi_attr_get_f"));
    }

    #[test]
    fn unit_sections_appear_in_order() {
        let text = generate_unit(&generator(), &fixtures::allgatherv()).unwrap();
        let at = |needle: &str| text.find(needle).unwrap_or_else(|| panic!("missing {}", needle));

        assert!(text.starts_with("#include \"ompi_config.h\"\n"));
        assert!(at("#if ! OMPI_BUILD_MPI_PROFILING") < at("#define ompi_allgatherv_f pompi_allgatherv_f"));
        assert!(at("#define ompi_allgatherv_f") < at("\nvoid\nompi_allgatherv_f("));
        assert!(at("c_COMM = MPI_Comm_f2c(*COMM);") < at("MPI_Comm_size(c_COMM, &intval_COMM);"));
        assert!(at("MPI_Comm_size(") < at("c_SENDTYPE = MPI_Type_f2c(*SENDTYPE);"));
        assert!(at("c_ierr = MPI_Allgatherv(") < at("if (NULL != IERROR)"));
    }

    #[test]
    fn long_interface_body_follows() {
        let text = generate_unit(&generator(), &fixtures::allgatherv()).unwrap();
        assert!(text.contains("\nvoid\nompi_allgatherv_c_f(const char *SENDBUF, const MPI_Count *SENDCOUNT,"));
        assert!(text.contains("c_ierr = MPI_Allgatherv_c("));
        assert!(text.contains("#define ompi_allgatherv_c_f pompi_allgatherv_c_f\n#endif // }"));
        assert!(occurs_once(&text, "\nvoid\nompi_allgatherv_c_f("));

        let text = generate_unit(&generator(), &fixtures::win_fence()).unwrap();
        assert!(!text.contains("_c_f("));
    }

    fn occurs_once(text: &str, needle: &str) -> bool {
        text.matches(needle).count() == 1
    }

    #[test]
    fn file_name_uses_the_suffix() {
        assert_eq!(unit_file_name(&fixtures::dist_graph_create()), "dist_graph_create_f.c");
    }
}
