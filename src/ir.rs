/// Statement IR for one emitted C function
///
/// The compiler passes produce these; `codegen::render` turns them into text.

#[derive(Debug, Clone, PartialEq)]
pub enum CStmt {
    Line(String), // A complete statement including its semicolon
    For {
        var: char,             // Loop index, always a `MPI_Count` declared at the top of the body
        bound: String,         // Exclusive upper bound expression
        body: Vec<CStmt>,
    },
    Guard {
        condition: String,     // Preprocessor condition, eg `OMPI_SIZEOF_FORTRAN_INTEGER != SIZEOF_INT`
        then: Vec<CStmt>,
        otherwise: Vec<CStmt>, // Empty means no `#else` branch
    },
}

impl CStmt {
    pub fn line(text: impl Into<String>) -> Self {
        CStmt::Line(text.into())
    }

    pub fn for_each(var: char, bound: impl Into<String>, body: Vec<CStmt>) -> Self {
        CStmt::For { var, bound: bound.into(), body }
    }

    pub fn guard(condition: impl Into<String>, then: Vec<CStmt>, otherwise: Vec<CStmt>) -> Self {
        CStmt::Guard { condition: condition.into(), then, otherwise }
    }
}

/// A local variable declaration, eg `MPI_Request *c_ARRAY_OF_REQUESTS = 0;`
#[derive(Debug, Clone, PartialEq)]
pub struct CDecl {
    pub ty: String,
    pub name: String,
    pub init: Option<String>,
}

impl CDecl {
    pub fn new(ty: impl Into<String>, name: impl Into<String>) -> Self {
        Self { ty: ty.into(), name: name.into(), init: None }
    }

    pub fn zeroed(ty: impl Into<String>, name: impl Into<String>) -> Self {
        Self { init: Some("0".to_string()), ..Self::new(ty, name) }
    }
}

/// Body of a generated function, grouped in emission order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionBody {
    pub declarations: Vec<CDecl>,
    pub early_conversions: Vec<CStmt>, // Communicators, needed by the size formulas
    pub scalar_sizes: Vec<CStmt>,
    pub array_sizes: Vec<CStmt>,
    pub conversions: Vec<CStmt>,
    pub call: Vec<CStmt>,
    pub write_backs: Vec<CStmt>,
    pub cleanup: Vec<CStmt>,
    pub epilogue: Vec<CStmt>,
}

impl FunctionBody {
    /// Statement groups after the declarations, in the order they are emitted.
    pub fn sections(&self) -> [&[CStmt]; 8] {
        [
            &self.early_conversions,
            &self.scalar_sizes,
            &self.array_sizes,
            &self.conversions,
            &self.call,
            &self.write_backs,
            &self.cleanup,
            &self.epilogue,
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CFunction {
    pub return_type: String,
    pub name: String,
    pub parameters: String,
    pub body: FunctionBody,
}
