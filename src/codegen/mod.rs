/// Code generation module - turns compiled bodies into C source text
///
/// ## Module Structure
/// - `backend`: alias modes and the entry-point strategies behind them
/// - `aliases`: external names per build mode and the alias block heading every unit
/// - `signature`: source-convention parameter lists
/// - `render`: statement IR to text
/// - `unit`: one translation unit per procedure
/// - `prototypes`: the aggregate declaration listing
mod aliases;
mod backend;
mod prototypes;
mod render;
mod signature;
mod unit;

pub use backend::AliasMode;
pub use prototypes::{prototypes_header, PROTOTYPES_FILE};
pub use unit::{generate_unit, unit_file_name};
