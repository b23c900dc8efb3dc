/// Hand-curated lookup tables
///
/// - sizes: where each array parameter's element count comes from
/// - widths: byte widths of scalar type tags and their configure macros
/// - handles: handle category to C type and translation functions
/// - exceptions: per-procedure special cases and small type mappings
mod exceptions;
mod handles;
mod sizes;
mod widths;

pub use exceptions::{callback_c_type, in_place_position, is_body_by_hand, is_func_name_exempt, return_c_type};
pub use handles::handle_conversion;
pub use sizes::{SizeFormula, SizeTable};
pub use widths::{source_c_type, TypeWidths};
