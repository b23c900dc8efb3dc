/// Type-Width Table
///
/// Byte widths of the scalar type tags that take part in width selection,
/// along with the configure macro that carries each width at build time.
use lazy_static::lazy_static;
use std::collections::HashMap;

/// (type tag, default width in bytes, configure macro)
const DEFAULT_WIDTHS: &[(&str, u32, &str)] = &[
    ("int", 4, "SIZEOF_INT"),
    ("MPI_Fint", 4, "OMPI_SIZEOF_FORTRAN_INTEGER"),
    ("MPI_Count", 8, "OMPI_MPI_COUNT_SIZE"),
    ("MPI_Offset", 8, "OMPI_MPI_OFFSET_SIZE"),
    ("MPI_Aint", 8, "SIZEOF_PTRDIFF_T"),
    ("INTEGER", 4, "OMPI_SIZEOF_FORTRAN_INTEGER"),
    ("LOGICAL", 4, "OMPI_SIZEOF_FORTRAN_LOGICAL"),
    ("INTEGER(KIND=MPI_COUNT_KIND)", 8, "OMPI_MPI_COUNT_SIZE"),
    ("INTEGER(KIND=MPI_OFFSET_KIND)", 8, "OMPI_MPI_OFFSET_SIZE"),
    ("INTEGER(KIND=MPI_ADDRESS_KIND)", 8, "SIZEOF_PTRDIFF_T"),
];

lazy_static! {
    /// configure macro -> every type tag whose width it carries
    static ref TAGS_BY_MACRO: HashMap<&'static str, Vec<&'static str>> = {
        let mut map: HashMap<&'static str, Vec<&'static str>> = HashMap::new();
        for (tag, _, macro_name) in DEFAULT_WIDTHS {
            map.entry(*macro_name).or_default().push(*tag);
        }
        map
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct WidthEntry {
    bytes: u32,
    macro_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeWidths {
    entries: HashMap<String, WidthEntry>,
}

impl Default for TypeWidths {
    fn default() -> Self {
        let entries = DEFAULT_WIDTHS
            .iter()
            .map(|(tag, bytes, macro_name)| {
                (tag.to_string(), WidthEntry { bytes: *bytes, macro_name: Some(macro_name.to_string()) })
            })
            .collect();
        TypeWidths { entries }
    }
}

impl TypeWidths {
    pub fn get(&self, tag: &str) -> Option<u32> {
        self.entries.get(tag).map(|entry| entry.bytes)
    }

    /// Override (or add) a tag's width. New tags have no configure macro.
    pub fn set(&mut self, tag: &str, bytes: u32) {
        self.entries
            .entry(tag.to_string())
            .and_modify(|entry| entry.bytes = bytes)
            .or_insert(WidthEntry { bytes, macro_name: None });
    }

    /// How a generation-time guard spells this tag's width: its configure
    /// macro when it has one, the literal byte count otherwise.
    pub fn guard_operand(&self, tag: &str) -> Option<String> {
        let entry = self.entries.get(tag)?;
        Some(match &entry.macro_name {
            Some(macro_name) => macro_name.clone(),
            None => entry.bytes.to_string(),
        })
    }

    /// Apply a `#define MACRO <bytes>` seen in a platform configuration header.
    /// Returns how many tags it touched.
    pub fn apply_define(&mut self, macro_name: &str, bytes: u32) -> usize {
        let Some(tags) = TAGS_BY_MACRO.get(macro_name) else {
            return 0;
        };
        for tag in tags {
            self.set(tag, bytes);
        }
        tags.len()
    }
}

/// C spelling of a source-convention integral type, as the emitted function
/// receives it by address.
pub fn source_c_type(tag: &str) -> &'static str {
    match tag {
        "INTEGER(KIND=MPI_ADDRESS_KIND)" => "MPI_Aint",
        "INTEGER(KIND=MPI_COUNT_KIND)" => "MPI_Count",
        "INTEGER(KIND=MPI_OFFSET_KIND)" => "MPI_Offset",
        "LOGICAL" => "ompi_fortran_logical_t",
        _ => "MPI_Fint",
    }
}
