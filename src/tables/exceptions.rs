/// Per-procedure exception lists and the small type-mapping tables that go with them
///
/// Procedure tables are keyed on the name without its `mpi_` prefix.
use crate::model::Procedure;
use lazy_static::lazy_static;
use std::collections::{HashMap, HashSet};

lazy_static! {
    /// Procedures whose body is written by hand; the unit only carries the prologue.
    static ref BODY_BY_HAND: HashSet<&'static str> = [
        "f_sync_reg",
        "sizeof",
        "keyval_create",
        "comm_create_keyval",
        "type_create_keyval",
        "win_create_keyval",
        "register_datarep",
        "attr_get",
        "attr_put",
    ]
    .into_iter()
    .collect();

    /// Argument position of the buffer that may carry the in-place marker.
    static ref IN_PLACE_POSITION: HashMap<&'static str, usize> = [
        ("gather", 0),
        ("gatherv", 0),
        ("scatter", 3),
        ("scatterv", 4),
        ("allgather", 0),
        ("allgatherv", 0),
        ("alltoall", 0),
        ("alltoallv", 0),
        ("alltoallw", 0),
        ("reduce", 0),
        ("allreduce", 0),
        ("reduce_scatter_block", 0),
        ("reduce_scatter", 0),
        ("scan", 0),
        ("exscan", 0),
    ]
    .into_iter()
    .collect();

    /// These name themselves in their own error reporting.
    static ref FUNC_NAME_EXEMPT: HashSet<&'static str> = [
        "comm_create_keyval",
        "keyval_create",
        "type_create_keyval",
        "win_create_keyval",
        "type_match_size",
    ]
    .into_iter()
    .collect();

    static ref CALLBACK_TYPES: HashMap<&'static str, &'static str> = [
        ("COPY_FUNCTION", "ompi_fint_copy_attr_function"),
        ("DELETE_FUNCTION", "ompi_fint_delete_attr_function"),
        ("COMM_COPY_ATTR_FUNCTION", "ompi_aint_copy_attr_function"),
        ("COMM_DELETE_ATTR_FUNCTION", "ompi_aint_delete_attr_function"),
        ("WIN_COPY_ATTR_FUNCTION", "ompi_aint_copy_attr_function"),
        ("WIN_DELETE_ATTR_FUNCTION", "ompi_aint_delete_attr_function"),
        ("TYPE_COPY_ATTR_FUNCTION", "ompi_aint_copy_attr_function"),
        ("TYPE_DELETE_ATTR_FUNCTION", "ompi_aint_delete_attr_function"),
        ("COMM_ERRHANDLER_FUNCTION", "ompi_errhandler_fortran_handler_fn_t *"),
        ("WIN_ERRHANDLER_FUNCTION", "ompi_errhandler_fortran_handler_fn_t *"),
        ("FILE_ERRHANDLER_FUNCTION", "ompi_errhandler_fortran_handler_fn_t *"),
        ("GREQUEST_QUERY_FUNCTION", "MPI_F_Grequest_query_function *"),
        ("GREQUEST_FREE_FUNCTION", "MPI_F_Grequest_free_function *"),
        ("GREQUEST_CANCEL_FUNCTION", "MPI_F_Grequest_cancel_function *"),
        ("USER_FUNCTION", "ompi_op_fortran_handler_fn_t *"),
        ("DATAREP_CONVERSION_FUNCTION", "ompi_mpi2_fortran_datarep_conversion_fn_t *"),
        ("DATAREP_EXTENT_FUNCTION", "ompi_mpi2_fortran_datarep_extent_fn_t *"),
    ]
    .into_iter()
    .collect();

    static ref RETURN_TYPES: HashMap<&'static str, &'static str> = [
        ("DOUBLE PRECISION", "ompi_fortran_double_precision_t"),
        ("INTEGER(KIND=MPI_ADDRESS_KIND)", "MPI_Aint"),
    ]
    .into_iter()
    .collect();
}

pub fn is_body_by_hand(procedure: &Procedure) -> bool {
    BODY_BY_HAND.contains(procedure.suffix())
}

pub fn in_place_position(procedure: &Procedure) -> Option<usize> {
    IN_PLACE_POSITION.get(procedure.suffix()).copied()
}

pub fn is_func_name_exempt(procedure: &Procedure) -> bool {
    FUNC_NAME_EXEMPT.contains(procedure.suffix())
}

/// C parameter type for a callback argument; unknown function types are
/// passed as plain Fortran integers.
pub fn callback_c_type(function_type: &str) -> &'static str {
    CALLBACK_TYPES.get(function_type).copied().unwrap_or("MPI_Fint *")
}

pub fn return_c_type(return_kind: &str) -> Option<&'static str> {
    RETURN_TYPES.get(return_kind).copied()
}
