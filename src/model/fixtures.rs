//! Builders for procedures used across the unit tests.
use super::*;

fn c_handle_type(category: HandleCategory) -> &'static str {
    match category {
        HandleCategory::Communicator => "MPI_Comm",
        HandleCategory::Datatype => "MPI_Datatype",
        HandleCategory::Request => "MPI_Request",
        HandleCategory::Window => "MPI_Win",
        HandleCategory::File => "MPI_File",
        HandleCategory::Group => "MPI_Group",
        HandleCategory::Info => "MPI_Info",
        HandleCategory::Operation => "MPI_Op",
        HandleCategory::Errhandler => "MPI_Errhandler",
        HandleCategory::Session => "MPI_Session",
        HandleCategory::Message => "MPI_Message",
    }
}

fn scalar_decl(base: &str, direction: Direction) -> Option<TargetDecl> {
    let ty = if direction == Direction::In { base.to_string() } else { format!("{}*", base) };
    Some(TargetDecl { ty, base_type: base.to_string() })
}

fn array_decl(base: &str) -> Option<TargetDecl> {
    Some(TargetDecl { ty: base.to_string(), base_type: base.to_string() })
}

pub fn integer(name: &str, direction: Direction) -> Parameter {
    Parameter {
        name: name.to_string(),
        kind: ParamKind::Integer,
        direction,
        dimensions: Dimensions::Scalar,
        source: TypePair::narrow("INTEGER"),
        target: TypePair::narrow("int"),
        call: scalar_decl("int", direction),
    }
}

pub fn integer_array(name: &str, direction: Direction) -> Parameter {
    Parameter {
        dimensions: Dimensions::Array,
        call: array_decl("int"),
        ..integer(name, direction)
    }
}

pub fn logical(name: &str, direction: Direction) -> Parameter {
    Parameter {
        name: name.to_string(),
        kind: ParamKind::Logical,
        direction,
        dimensions: Dimensions::Scalar,
        source: TypePair::narrow("LOGICAL"),
        target: TypePair::narrow("int"),
        call: scalar_decl("int", direction),
    }
}

pub fn count(name: &str) -> Parameter {
    Parameter {
        name: name.to_string(),
        kind: ParamKind::TransferCount,
        direction: Direction::In,
        dimensions: Dimensions::Scalar,
        source: TypePair::with_wide("INTEGER", "INTEGER(KIND=MPI_COUNT_KIND)"),
        target: TypePair::with_wide("int", "MPI_Count"),
        call: scalar_decl("int", Direction::In),
    }
}

pub fn counts(name: &str) -> Parameter {
    Parameter {
        dimensions: Dimensions::Array,
        call: array_decl("int"),
        ..count(name)
    }
}

pub fn handle(name: &str, category: HandleCategory, direction: Direction) -> Parameter {
    let ctype = c_handle_type(category);
    Parameter {
        name: name.to_string(),
        kind: ParamKind::Handle(category),
        direction,
        dimensions: Dimensions::Scalar,
        source: TypePair::narrow("INTEGER"),
        target: TypePair::narrow(ctype),
        call: scalar_decl(ctype, direction),
    }
}

pub fn handle_array(name: &str, category: HandleCategory, direction: Direction) -> Parameter {
    let ctype = c_handle_type(category);
    Parameter {
        dimensions: Dimensions::Array,
        call: array_decl(ctype),
        ..handle(name, category, direction)
    }
}

pub fn buffer(name: &str, direction: Direction) -> Parameter {
    Parameter {
        name: name.to_string(),
        kind: ParamKind::Buffer,
        direction,
        dimensions: Dimensions::Array,
        source: TypePair::narrow("CHOICE"),
        target: TypePair::narrow("void"),
        call: Some(TargetDecl { ty: "void*".to_string(), base_type: "void".to_string() }),
    }
}

pub fn string(name: &str, direction: Direction) -> Parameter {
    Parameter {
        name: name.to_string(),
        kind: ParamKind::String,
        direction,
        dimensions: Dimensions::Scalar,
        source: TypePair::narrow("CHARACTER*(*)"),
        target: TypePair::narrow("char"),
        call: Some(TargetDecl { ty: "char*".to_string(), base_type: "char".to_string() }),
    }
}

pub fn status(name: &str) -> Parameter {
    Parameter {
        name: name.to_string(),
        kind: ParamKind::Status,
        direction: Direction::Out,
        dimensions: Dimensions::Status,
        source: TypePair::narrow("INTEGER"),
        target: TypePair::narrow("MPI_Status"),
        call: scalar_decl("MPI_Status", Direction::Out),
    }
}

pub fn ierror() -> Parameter {
    Parameter { call: None, ..integer("IERROR", Direction::Out) }
}

pub fn procedure(name: &str, parameters: Vec<Parameter>) -> Procedure {
    Procedure { name: name.to_string(), parameters, return_kind: None }
}

/// `MPI_DIST_GRAPH_CREATE`: DESTINATIONS and WEIGHTS are sized by the sum of DEGREES.
pub fn dist_graph_create() -> Procedure {
    procedure(
        "mpi_dist_graph_create",
        vec![
            handle("COMM_OLD", HandleCategory::Communicator, Direction::In),
            integer("N", Direction::In),
            integer_array("SOURCES", Direction::In),
            integer_array("DEGREES", Direction::In),
            integer_array("DESTINATIONS", Direction::In),
            integer_array("WEIGHTS", Direction::In),
            handle("INFO", HandleCategory::Info, Direction::In),
            logical("REORDER", Direction::In),
            handle("COMM_DIST_GRAPH", HandleCategory::Communicator, Direction::Out),
            ierror(),
        ],
    )
}

/// `MPI_ALLGATHERV`: RECVCOUNTS and DISPLS are sized by the communicator.
pub fn allgatherv() -> Procedure {
    procedure(
        "mpi_allgatherv",
        vec![
            buffer("SENDBUF", Direction::In),
            count("SENDCOUNT"),
            handle("SENDTYPE", HandleCategory::Datatype, Direction::In),
            buffer("RECVBUF", Direction::Out),
            counts("RECVCOUNTS"),
            counts("DISPLS"),
            handle("RECVTYPE", HandleCategory::Datatype, Direction::In),
            handle("COMM", HandleCategory::Communicator, Direction::In),
            ierror(),
        ],
    )
}

/// `MPI_GRAPH_CREATE`: EDGES is sized by the last entry of INDEX.
pub fn graph_create() -> Procedure {
    procedure(
        "mpi_graph_create",
        vec![
            handle("COMM_OLD", HandleCategory::Communicator, Direction::In),
            integer("NNODES", Direction::In),
            integer_array("INDEX", Direction::In),
            integer_array("EDGES", Direction::In),
            logical("REORDER", Direction::In),
            handle("COMM_GRAPH", HandleCategory::Communicator, Direction::Out),
            ierror(),
        ],
    )
}

/// `MPI_CART_RANK`: COORDS is sized by the topology dimension of COMM.
pub fn cart_rank() -> Procedure {
    procedure(
        "mpi_cart_rank",
        vec![
            handle("COMM", HandleCategory::Communicator, Direction::In),
            integer_array("COORDS", Direction::In),
            integer("RANK", Direction::Out),
            ierror(),
        ],
    )
}

/// `MPI_WAITALL`: requests are converted both ways.
pub fn waitall() -> Procedure {
    let mut statuses = status("ARRAY_OF_STATUSES");
    statuses.dimensions = Dimensions::StatusArray;
    statuses.call = array_decl("MPI_Status");
    procedure(
        "mpi_waitall",
        vec![
            integer("COUNT", Direction::In),
            handle_array("ARRAY_OF_REQUESTS", HandleCategory::Request, Direction::Inout),
            statuses,
            ierror(),
        ],
    )
}

/// `MPI_GROUP_RANGE_INCL`: RANGES is N 3-tuples.
pub fn group_range_incl() -> Procedure {
    let mut ranges = integer_array("RANGES", Direction::In);
    ranges.dimensions = Dimensions::Fixed { inner: 3 };
    procedure(
        "mpi_group_range_incl",
        vec![
            handle("GROUP", HandleCategory::Group, Direction::In),
            integer("N", Direction::In),
            ranges,
            handle("NEWGROUP", HandleCategory::Group, Direction::Out),
            ierror(),
        ],
    )
}

/// Only plain integers and no handles, eg `MPI_TYPE_SIZE`-like shapes stripped of handles.
pub fn scalars_only() -> Procedure {
    procedure(
        "mpi_pcontrol_like",
        vec![
            integer("LEVEL", Direction::In),
            integer("VALUE", Direction::Inout),
            integer("RESULT", Direction::Out),
            ierror(),
        ],
    )
}

/// `MPI_WTIME` returns a value and has no error code.
pub fn wtime() -> Procedure {
    Procedure {
        name: "mpi_wtime".to_string(),
        parameters: vec![],
        return_kind: Some("DOUBLE PRECISION".to_string()),
    }
}

/// `MPI_WIN_FENCE`-style procedure touching a window only.
pub fn win_fence() -> Procedure {
    procedure(
        "mpi_win_fence",
        vec![
            integer("ASSERT", Direction::In),
            handle("WIN", HandleCategory::Window, Direction::In),
            ierror(),
        ],
    )
}

/// `MPI_GET_PROCESSOR_NAME`: out string plus out length.
pub fn get_processor_name() -> Procedure {
    procedure(
        "mpi_get_processor_name",
        vec![string("NAME", Direction::Out), integer("RESULTLEN", Direction::Out), ierror()],
    )
}
