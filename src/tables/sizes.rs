/// Size-formula table
///
/// The curated `PROCEDURE:PARAMETER -> formula` mapping that tells the size
/// resolver where every array's element count comes from. The standard does not
/// allow inferring these structurally, so the table is the source of truth.
/// Formulas are parsed once and validated for duplicate keys at load time.
use crate::error::GenError;
use crate::model::Procedure;
use std::collections::HashMap;
use std::fmt;

/// Builtin entries. Request arrays are sized by their bare count argument.
const BUILTIN_SIZES: &[(&str, &str)] = &[
    ("MPI_COMM_SPAWN:ARRAY_OF_ERRCODES", "MAXPROCS"),
    ("MPI_COMM_SPAWN_MULTIPLE:ARRAY_OF_COMMANDS", "COUNT"),
    ("MPI_COMM_SPAWN_MULTIPLE:ARRAY_OF_ARGV", "COUNT"),
    ("MPI_COMM_SPAWN_MULTIPLE:ARRAY_OF_MAXPROCS", "COUNT"),
    ("MPI_COMM_SPAWN_MULTIPLE:ARRAY_OF_INFO", "COUNT"),
    ("MPI_COMM_SPAWN_MULTIPLE:ARRAY_OF_ERRCODES", "fintsum ARRAY_OF_MAXPROCS COUNT"),
    ("MPI_CART_COORDS:COORDS", "MAXDIMS"),
    ("MPI_DIMS_CREATE:DIMS", "NDIMS"),
    ("MPI_CART_CREATE:DIMS", "NDIMS"),
    ("MPI_CART_CREATE:PERIODS", "NDIMS"),
    ("MPI_CART_GET:DIMS", "MAXDIMS"),
    ("MPI_CART_GET:PERIODS", "MAXDIMS"),
    ("MPI_CART_GET:COORDS", "MAXDIMS"),
    ("MPI_CART_MAP:DIMS", "NDIMS"),
    ("MPI_CART_MAP:PERIODS", "NDIMS"),
    ("MPI_CART_RANK:COORDS", "cartdim COMM"),
    ("MPI_CART_SUB:REMAIN_DIMS", "cartdim COMM"),
    ("MPI_GRAPH_CREATE:INDEX", "NNODES"),
    ("MPI_GRAPH_CREATE:EDGES", "fintlast INDEX NNODES"),
    ("MPI_GRAPH_GET:INDEX", "MAXINDEX"),
    ("MPI_GRAPH_GET:EDGES", "MAXEDGES"),
    ("MPI_GRAPH_MAP:INDEX", "NNODES"),
    ("MPI_GRAPH_MAP:EDGES", "fintlast INDEX NNODES"),
    ("MPI_GRAPH_NEIGHBORS:NEIGHBORS", "MAXNEIGHBORS"),
    ("MPI_GROUP_EXCL:RANKS", "N"),
    ("MPI_GROUP_INCL:RANKS", "N"),
    ("MPI_GROUP_RANGE_EXCL:RANGES", "N"),
    ("MPI_GROUP_RANGE_INCL:RANGES", "N"),
    ("MPI_GROUP_TRANSLATE_RANKS:RANKS1", "N"),
    ("MPI_GROUP_TRANSLATE_RANKS:RANKS2", "N"),
    ("MPI_DIST_GRAPH_CREATE:SOURCES", "N"),
    ("MPI_DIST_GRAPH_CREATE:DEGREES", "N"),
    ("MPI_DIST_GRAPH_CREATE:DESTINATIONS", "fintsum DEGREES N"),
    ("MPI_DIST_GRAPH_CREATE:WEIGHTS", "fintsum DEGREES N"),
    ("MPI_DIST_GRAPH_CREATE_ADJACENT:SOURCES", "INDEGREE"),
    ("MPI_DIST_GRAPH_CREATE_ADJACENT:SOURCEWEIGHTS", "INDEGREE"),
    ("MPI_DIST_GRAPH_CREATE_ADJACENT:DESTINATIONS", "OUTDEGREE"),
    ("MPI_DIST_GRAPH_CREATE_ADJACENT:DESTWEIGHTS", "OUTDEGREE"),
    ("MPI_DIST_GRAPH_NEIGHBORS:SOURCES", "MAXINDEGREE"),
    ("MPI_DIST_GRAPH_NEIGHBORS:SOURCEWEIGHTS", "MAXINDEGREE"),
    ("MPI_DIST_GRAPH_NEIGHBORS:DESTINATIONS", "MAXOUTDEGREE"),
    ("MPI_DIST_GRAPH_NEIGHBORS:DESTWEIGHTS", "MAXOUTDEGREE"),
    ("MPI_PREADY_LIST:ARRAY_OF_PARTITIONS", "LENGTH"),
    ("MPI_STARTALL:ARRAY_OF_REQUESTS", "COUNT"),
    ("MPI_TESTALL:ARRAY_OF_REQUESTS", "COUNT"),
    ("MPI_TESTANY:ARRAY_OF_REQUESTS", "COUNT"),
    ("MPI_TESTSOME:ARRAY_OF_REQUESTS", "INCOUNT"),
    ("MPI_TESTSOME:ARRAY_OF_INDICES", "INCOUNT"),
    ("MPI_WAITALL:ARRAY_OF_REQUESTS", "COUNT"),
    ("MPI_WAITANY:ARRAY_OF_REQUESTS", "COUNT"),
    ("MPI_WAITSOME:ARRAY_OF_REQUESTS", "INCOUNT"),
    ("MPI_WAITSOME:ARRAY_OF_INDICES", "INCOUNT"),
    ("MPI_TYPE_CREATE_HINDEXED:ARRAY_OF_BLOCKLENGTHS", "COUNT"),
    ("MPI_TYPE_CREATE_HINDEXED:ARRAY_OF_DISPLACEMENTS", "COUNT"),
    ("MPI_TYPE_CREATE_HINDEXED_BLOCK:ARRAY_OF_DISPLACEMENTS", "COUNT"),
    ("MPI_TYPE_CREATE_INDEXED_BLOCK:ARRAY_OF_DISPLACEMENTS", "COUNT"),
    ("MPI_TYPE_CREATE_STRUCT:ARRAY_OF_BLOCKLENGTHS", "COUNT"),
    ("MPI_TYPE_CREATE_STRUCT:ARRAY_OF_DISPLACEMENTS", "COUNT"),
    ("MPI_TYPE_CREATE_STRUCT:ARRAY_OF_TYPES", "COUNT"),
    ("MPI_TYPE_CREATE_DARRAY:ARRAY_OF_GSIZES", "NDIMS"),
    ("MPI_TYPE_CREATE_DARRAY:ARRAY_OF_DISTRIBS", "NDIMS"),
    ("MPI_TYPE_CREATE_DARRAY:ARRAY_OF_DARGS", "NDIMS"),
    ("MPI_TYPE_CREATE_DARRAY:ARRAY_OF_PSIZES", "NDIMS"),
    ("MPI_TYPE_CREATE_SUBARRAY:ARRAY_OF_SIZES", "NDIMS"),
    ("MPI_TYPE_CREATE_SUBARRAY:ARRAY_OF_SUBSIZES", "NDIMS"),
    ("MPI_TYPE_CREATE_SUBARRAY:ARRAY_OF_STARTS", "NDIMS"),
    ("MPI_TYPE_INDEXED:ARRAY_OF_BLOCKLENGTHS", "COUNT"),
    ("MPI_TYPE_INDEXED:ARRAY_OF_DISPLACEMENTS", "COUNT"),
    ("MPI_TYPE_GET_CONTENTS:ARRAY_OF_INTEGERS", "MAX_INTEGERS"),
    ("MPI_TYPE_GET_CONTENTS:ARRAY_OF_ADDRESSES", "MAX_INTEGERS"),
    ("MPI_TYPE_GET_CONTENTS:ARRAY_OF_DATATYPES", "MAX_INTEGERS"),
    ("MPI_ALLGATHERV:RECVCOUNTS", "commsize COMM"),
    ("MPI_ALLGATHERV:DISPLS", "commsize COMM"),
    ("MPI_ALLGATHERV_INIT:RECVCOUNTS", "commsize COMM"),
    ("MPI_ALLGATHERV_INIT:DISPLS", "commsize COMM"),
    ("MPI_ALLTOALLV:SENDCOUNTS", "commsize COMM"),
    ("MPI_ALLTOALLV:SDISPLS", "commsize COMM"),
    ("MPI_ALLTOALLV:RECVCOUNTS", "commsize COMM"),
    ("MPI_ALLTOALLV:RDISPLS", "commsize COMM"),
    ("MPI_ALLTOALLV_INIT:SENDCOUNTS", "commsize COMM"),
    ("MPI_ALLTOALLV_INIT:SDISPLS", "commsize COMM"),
    ("MPI_ALLTOALLV_INIT:RECVCOUNTS", "commsize COMM"),
    ("MPI_ALLTOALLV_INIT:RDISPLS", "commsize COMM"),
    ("MPI_ALLTOALLW:SENDCOUNTS", "commsize COMM"),
    ("MPI_ALLTOALLW:SDISPLS", "commsize COMM"),
    ("MPI_ALLTOALLW:SENDTYPES", "commsize COMM"),
    ("MPI_ALLTOALLW:RECVCOUNTS", "commsize COMM"),
    ("MPI_ALLTOALLW:RDISPLS", "commsize COMM"),
    ("MPI_ALLTOALLW:RECVTYPES", "commsize COMM"),
    ("MPI_ALLTOALLW_INIT:SENDCOUNTS", "commsize COMM"),
    ("MPI_ALLTOALLW_INIT:SDISPLS", "commsize COMM"),
    ("MPI_ALLTOALLW_INIT:SENDTYPES", "commsize COMM"),
    ("MPI_ALLTOALLW_INIT:RECVCOUNTS", "commsize COMM"),
    ("MPI_ALLTOALLW_INIT:RDISPLS", "commsize COMM"),
    ("MPI_ALLTOALLW_INIT:RECVTYPES", "commsize COMM"),
    ("MPI_GATHERV:RECVCOUNTS", "commsize COMM"),
    ("MPI_GATHERV:DISPLS", "commsize COMM"),
    ("MPI_SCATTERV:SENDCOUNTS", "commsize COMM"),
    ("MPI_SCATTERV:DISPLS", "commsize COMM"),
    ("MPI_SCATTERV_INIT:SENDCOUNTS", "commsize COMM"),
    ("MPI_SCATTERV_INIT:DISPLS", "commsize COMM"),
    ("MPI_REDUCE_SCATTER:RECVCOUNTS", "commsize COMM"),
    ("MPI_REDUCE_SCATTER_INIT:RECVCOUNTS", "commsize COMM"),
    ("MPI_GATHERV_INIT:RECVCOUNTS", "commsize COMM"),
    ("MPI_GATHERV_INIT:DISPLS", "commsize COMM"),
    ("MPI_IALLGATHERV:RECVCOUNTS", "commsize COMM"),
    ("MPI_IALLGATHERV:DISPLS", "commsize COMM"),
    ("MPI_IALLTOALLV:SENDCOUNTS", "commsize COMM"),
    ("MPI_IALLTOALLV:SDISPLS", "commsize COMM"),
    ("MPI_IALLTOALLV:RECVCOUNTS", "commsize COMM"),
    ("MPI_IALLTOALLV:RDISPLS", "commsize COMM"),
    ("MPI_IALLTOALLW:SENDCOUNTS", "commsize COMM"),
    ("MPI_IALLTOALLW:SDISPLS", "commsize COMM"),
    ("MPI_IALLTOALLW:SENDTYPES", "commsize COMM"),
    ("MPI_IALLTOALLW:RECVCOUNTS", "commsize COMM"),
    ("MPI_IALLTOALLW:RDISPLS", "commsize COMM"),
    ("MPI_IALLTOALLW:RECVTYPES", "commsize COMM"),
    ("MPI_IGATHERV:RECVCOUNTS", "commsize COMM"),
    ("MPI_IGATHERV:DISPLS", "commsize COMM"),
    ("MPI_ISCATTERV:SENDCOUNTS", "commsize COMM"),
    ("MPI_ISCATTERV:DISPLS", "commsize COMM"),
    ("MPI_IREDUCE_SCATTER:RECVCOUNTS", "commsize COMM"),
    ("MPI_NEIGHBOR_ALLGATHERV:RECVCOUNTS", "commsize COMM"),
    ("MPI_NEIGHBOR_ALLGATHERV:DISPLS", "commsize COMM"),
    ("MPI_NEIGHBOR_ALLGATHERV_INIT:RECVCOUNTS", "commsize COMM"),
    ("MPI_NEIGHBOR_ALLGATHERV_INIT:DISPLS", "commsize COMM"),
    ("MPI_NEIGHBOR_ALLTOALLV:SENDCOUNTS", "commsize COMM"),
    ("MPI_NEIGHBOR_ALLTOALLV:SDISPLS", "commsize COMM"),
    ("MPI_NEIGHBOR_ALLTOALLV:RECVCOUNTS", "commsize COMM"),
    ("MPI_NEIGHBOR_ALLTOALLV:RDISPLS", "commsize COMM"),
    ("MPI_NEIGHBOR_ALLTOALLV_INIT:SENDCOUNTS", "commsize COMM"),
    ("MPI_NEIGHBOR_ALLTOALLV_INIT:SDISPLS", "commsize COMM"),
    ("MPI_NEIGHBOR_ALLTOALLV_INIT:RECVCOUNTS", "commsize COMM"),
    ("MPI_NEIGHBOR_ALLTOALLV_INIT:RDISPLS", "commsize COMM"),
    ("MPI_NEIGHBOR_ALLTOALLW:SENDCOUNTS", "commsize COMM"),
    ("MPI_NEIGHBOR_ALLTOALLW:SDISPLS", "commsize COMM"),
    ("MPI_NEIGHBOR_ALLTOALLW:SENDTYPES", "commsize COMM"),
    ("MPI_NEIGHBOR_ALLTOALLW:RECVCOUNTS", "commsize COMM"),
    ("MPI_NEIGHBOR_ALLTOALLW:RDISPLS", "commsize COMM"),
    ("MPI_NEIGHBOR_ALLTOALLW:RECVTYPES", "commsize COMM"),
    ("MPI_NEIGHBOR_ALLTOALLW_INIT:SENDCOUNTS", "commsize COMM"),
    ("MPI_NEIGHBOR_ALLTOALLW_INIT:SDISPLS", "commsize COMM"),
    ("MPI_NEIGHBOR_ALLTOALLW_INIT:SENDTYPES", "commsize COMM"),
    ("MPI_NEIGHBOR_ALLTOALLW_INIT:RECVCOUNTS", "commsize COMM"),
    ("MPI_NEIGHBOR_ALLTOALLW_INIT:RDISPLS", "commsize COMM"),
    ("MPI_NEIGHBOR_ALLTOALLW_INIT:RECVTYPES", "commsize COMM"),
    ("MPI_INEIGHBOR_ALLGATHERV:RECVCOUNTS", "commsize COMM"),
    ("MPI_INEIGHBOR_ALLGATHERV:DISPLS", "commsize COMM"),
    ("MPI_INEIGHBOR_ALLTOALLV:SENDCOUNTS", "commsize COMM"),
    ("MPI_INEIGHBOR_ALLTOALLV:SDISPLS", "commsize COMM"),
    ("MPI_INEIGHBOR_ALLTOALLV:RECVCOUNTS", "commsize COMM"),
    ("MPI_INEIGHBOR_ALLTOALLV:RDISPLS", "commsize COMM"),
    ("MPI_INEIGHBOR_ALLTOALLW:SENDCOUNTS", "commsize COMM"),
    ("MPI_INEIGHBOR_ALLTOALLW:SDISPLS", "commsize COMM"),
    ("MPI_INEIGHBOR_ALLTOALLW:SENDTYPES", "commsize COMM"),
    ("MPI_INEIGHBOR_ALLTOALLW:RECVCOUNTS", "commsize COMM"),
    ("MPI_INEIGHBOR_ALLTOALLW:RDISPLS", "commsize COMM"),
    ("MPI_INEIGHBOR_ALLTOALLW:RECVTYPES", "commsize COMM"),
];

/// Parameters that are array-shaped but carry their own terminator.
const EXEMPT: &[(&str, &str)] = &[("comm_spawn", "ARGV")];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeFormula {
    /// `X`: the dereferenced scalar value of parameter X
    Deref(String),
    /// `commsize X`
    CommSize(String),
    /// `cartdim X`
    CartDim(String),
    /// `fintsum A B`: sum of the first B elements of A
    FintSum { array: String, count: String },
    /// `fintlast A B`: element B-1 of A
    FintLast { array: String, count: String },
}

fn is_identifier(token: &str) -> bool {
    !token.is_empty()
        && token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !token.starts_with(|c: char| c.is_ascii_digit())
}

impl SizeFormula {
    pub fn parse(key: &str, text: &str) -> Result<Self, GenError> {
        let bad = || GenError::BadFormula { key: key.to_string(), formula: text.to_string() };
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.is_empty() || !tokens.iter().all(|token| is_identifier(token)) {
            return Err(bad());
        }

        match tokens.as_slice() {
            [name] => Ok(SizeFormula::Deref(name.to_string())),
            ["commsize", comm] => Ok(SizeFormula::CommSize(comm.to_string())),
            ["cartdim", comm] => Ok(SizeFormula::CartDim(comm.to_string())),
            ["fintsum", array, count] => Ok(SizeFormula::FintSum { array: array.to_string(), count: count.to_string() }),
            ["fintlast", array, count] => Ok(SizeFormula::FintLast { array: array.to_string(), count: count.to_string() }),
            _ => Err(bad()),
        }
    }
}

impl fmt::Display for SizeFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeFormula::Deref(name) => write!(f, "{}", name),
            SizeFormula::CommSize(comm) => write!(f, "commsize {}", comm),
            SizeFormula::CartDim(comm) => write!(f, "cartdim {}", comm),
            SizeFormula::FintSum { array, count } => write!(f, "fintsum {} {}", array, count),
            SizeFormula::FintLast { array, count } => write!(f, "fintlast {} {}", array, count),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SizeTable {
    entries: HashMap<String, SizeFormula>,
}

impl SizeTable {
    pub fn builtin() -> Result<Self, GenError> {
        let mut table = SizeTable::default();
        table.extend(BUILTIN_SIZES.iter().copied())?;
        Ok(table)
    }

    /// Add entries, rejecting keys that are already present.
    pub fn extend<'a>(&mut self, entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<(), GenError> {
        for (key, text) in entries {
            let formula = SizeFormula::parse(key, text)?;
            if self.entries.insert(key.to_string(), formula).is_some() {
                return Err(GenError::DuplicateKey { table: "size formulas", key: key.to_string() });
            }
        }
        Ok(())
    }

    pub fn lookup(&self, procedure: &Procedure, parameter: &str) -> Option<&SizeFormula> {
        self.entries.get(&format!("{}:{}", procedure.upper_name(), parameter))
    }

    pub fn is_exempt(procedure: &Procedure, parameter: &str) -> bool {
        EXEMPT.iter().any(|(name, param)| *name == procedure.suffix() && *param == parameter)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
