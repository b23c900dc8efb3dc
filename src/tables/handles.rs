/// Handle-category table: target type and the two translation functions
use crate::model::HandleCategory;
use lazy_static::lazy_static;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleConversion {
    pub c_type: &'static str,
    pub f2c: &'static str,
    pub c2f: &'static str,
}

lazy_static! {
    static ref HANDLES: HashMap<HandleCategory, HandleConversion> = {
        use HandleCategory::*;
        let rows = [
            (Communicator, "MPI_Comm", "MPI_Comm_f2c", "MPI_Comm_c2f"),
            (Datatype, "MPI_Datatype", "MPI_Type_f2c", "MPI_Type_c2f"),
            (Request, "MPI_Request", "MPI_Request_f2c", "MPI_Request_c2f"),
            (Window, "MPI_Win", "MPI_Win_f2c", "MPI_Win_c2f"),
            (File, "MPI_File", "MPI_File_f2c", "MPI_File_c2f"),
            (Group, "MPI_Group", "MPI_Group_f2c", "MPI_Group_c2f"),
            (Info, "MPI_Info", "MPI_Info_f2c", "MPI_Info_c2f"),
            (Operation, "MPI_Op", "MPI_Op_f2c", "MPI_Op_c2f"),
            (Errhandler, "MPI_Errhandler", "MPI_Errhandler_f2c", "MPI_Errhandler_c2f"),
            (Session, "MPI_Session", "MPI_Session_f2c", "MPI_Session_c2f"),
            (Message, "MPI_Message", "MPI_Message_f2c", "MPI_Message_c2f"),
        ];
        rows.into_iter()
            .map(|(category, c_type, f2c, c2f)| (category, HandleConversion { c_type, f2c, c2f }))
            .collect()
    };
}

pub fn handle_conversion(category: HandleCategory) -> Option<HandleConversion> {
    HANDLES.get(&category).copied()
}
