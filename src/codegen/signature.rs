/// Source-convention C signatures
///
/// Maps each source parameter to the C type it arrives as. The same parameter
/// list is shared by the canonical function, its forwarding stubs and the
/// prototype listing.
use crate::error::GenError;
use crate::model::{Dimensions, Direction, ParamKind, Parameter, Procedure, Width};
use crate::tables::{callback_c_type, return_c_type};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub return_type: String,
    /// Declared parameter list, `void` when empty
    pub parameters: String,
    /// Names in the same order, for forwarding calls
    pub arguments: String,
    pub returns_value: bool,
}

fn source_type(tag: &str) -> &'static str {
    match tag {
        "INTEGER(KIND=MPI_ADDRESS_KIND)" => "MPI_Aint *",
        "INTEGER(KIND=MPI_COUNT_KIND)" => "MPI_Count *",
        "INTEGER(KIND=MPI_OFFSET_KIND)" => "MPI_Offset *",
        "CHARACTER*(*)" => "char *",
        "LOGICAL" => "ompi_fortran_logical_t *",
        "TYPE(MPI_Status)" => "MPI_F08_status *",
        _ => "MPI_Fint *",
    }
}

fn declare(procedure: &Procedure, param: &Parameter, width: Width) -> String {
    let mut c_type = match &param.kind {
        ParamKind::Buffer => "char *".to_string(),
        ParamKind::Callback(function_type) => callback_c_type(function_type).to_string(),
        _ => source_type(param.source.at(width)).to_string(),
    };

    let extent = match &param.dimensions {
        Dimensions::Fixed { inner } => format!("[][{}]", inner),
        Dimensions::Other(text) => {
            if !param.kind.is_string() {
                warn!(procedure = %procedure.name, parameter = %param.name, dims = %text, "no C array form for dimensions");
            }
            String::new()
        }
        _ => String::new(),
    };
    if !extent.is_empty() {
        c_type = c_type.trim_end_matches(['*', ' ']).to_string();
    }
    let callback = matches!(param.kind, ParamKind::Callback(_));
    if param.direction == Direction::In && !callback {
        c_type.insert_str(0, "const ");
    }

    if c_type.ends_with('*') {
        format!("{}{}{}", c_type, param.name, extent)
    } else {
        format!("{} {}{}", c_type, param.name, extent)
    }
}

impl Signature {
    pub fn for_procedure(procedure: &Procedure, width: Width) -> Result<Self, GenError> {
        let return_type = match &procedure.return_kind {
            Some(kind) => return_c_type(kind).ok_or_else(|| GenError::MissingReturnType {
                procedure: procedure.name.clone(),
                type_tag: kind.clone(),
            })?,
            None => "void",
        };

        // Hidden string lengths trail every declared parameter
        let lengths: Vec<String> = procedure
            .parameters
            .iter()
            .filter(|param| param.kind.is_string())
            .map(|param| format!("{}_len", param.name))
            .collect();

        let mut declared: Vec<String> = procedure.parameters.iter().map(|param| declare(procedure, param, width)).collect();
        declared.extend(lengths.iter().map(|length| format!("int {}", length)));
        let mut passed: Vec<String> = procedure.parameters.iter().map(|param| param.name.clone()).collect();
        passed.extend(lengths);

        Ok(Signature {
            return_type: return_type.to_string(),
            parameters: if declared.is_empty() { "void".to_string() } else { declared.join(", ") },
            arguments: passed.join(", "),
            returns_value: procedure.return_kind.is_some(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures;

    #[test]
    fn collective_parameter_list() {
        let signature = Signature::for_procedure(&fixtures::allgatherv(), Width::Narrow).unwrap();
        assert_eq!(signature.return_type, "void");
        assert_eq!(
            signature.parameters,
            "const char *SENDBUF, const MPI_Fint *SENDCOUNT, const MPI_Fint *SENDTYPE, char *RECVBUF, \
             const MPI_Fint *RECVCOUNTS, const MPI_Fint *DISPLS, const MPI_Fint *RECVTYPE, const MPI_Fint *COMM, \
             MPI_Fint *IERROR"
        );
        assert_eq!(signature.arguments, "SENDBUF, SENDCOUNT, SENDTYPE, RECVBUF, RECVCOUNTS, DISPLS, RECVTYPE, COMM, IERROR");
    }

    #[test]
    fn wide_source_tags_pick_wide_types() {
        let mut procedure = fixtures::procedure("mpi_get_count_like", vec![fixtures::count("COUNT"), fixtures::ierror()]);
        procedure.parameters[0].direction = Direction::Out;
        let narrow = Signature::for_procedure(&procedure, Width::Narrow).unwrap();
        let wide = Signature::for_procedure(&procedure, Width::Wide).unwrap();
        assert_eq!(narrow.parameters, "MPI_Fint *COUNT, MPI_Fint *IERROR");
        assert_eq!(wide.parameters, "MPI_Count *COUNT, MPI_Fint *IERROR");
    }

    #[test]
    fn fixed_rows_become_two_dimensional() {
        let signature = Signature::for_procedure(&fixtures::group_range_incl(), Width::Narrow).unwrap();
        assert!(signature.parameters.contains("const MPI_Fint RANGES[][3]"));
    }

    #[test]
    fn string_lengths_trail_the_list() {
        let signature = Signature::for_procedure(&fixtures::get_processor_name(), Width::Narrow).unwrap();
        assert_eq!(signature.parameters, "char *NAME, MPI_Fint *RESULTLEN, MPI_Fint *IERROR, int NAME_len");
        assert_eq!(signature.arguments, "NAME, RESULTLEN, IERROR, NAME_len");
    }

    #[test]
    fn empty_list_is_void_and_return_kind_is_mapped() {
        let signature = Signature::for_procedure(&fixtures::wtime(), Width::Narrow).unwrap();
        assert_eq!(signature.parameters, "void");
        assert_eq!(signature.arguments, "");
        assert_eq!(signature.return_type, "ompi_fortran_double_precision_t");
        assert!(signature.returns_value);
    }

    #[test]
    fn callbacks_and_logicals() {
        let mut function = fixtures::integer("FUNCTION", Direction::In);
        function.kind = ParamKind::Callback("USER_FUNCTION".to_string());
        let commute = fixtures::logical("COMMUTE", Direction::In);
        let procedure = fixtures::procedure("mpi_op_create", vec![function, commute, fixtures::ierror()]);

        let signature = Signature::for_procedure(&procedure, Width::Narrow).unwrap();
        assert_eq!(
            signature.parameters,
            "ompi_op_fortran_handler_fn_t *FUNCTION, const ompi_fortran_logical_t *COMMUTE, MPI_Fint *IERROR"
        );
    }
}
