/// Text rendering of the statement IR
use crate::ir::{CDecl, CFunction, CStmt};

const INDENT: &str = "    ";

/// Loop indices every body declares, whether or not a loop is emitted.
const LOOP_INDICES: &str = "MPI_Count i = 0, j = 0;";

pub fn render_decl(decl: &CDecl) -> String {
    let separator = if decl.ty.ends_with('*') { "" } else { " " };
    match &decl.init {
        Some(init) => format!("{}{}{} = {};", decl.ty, separator, decl.name, init),
        None => format!("{}{}{};", decl.ty, separator, decl.name),
    }
}

fn push_statements(statements: &[CStmt], depth: usize, out: &mut Vec<String>) {
    for stmt in statements {
        push_statement(stmt, depth, out);
    }
}

fn push_statement(stmt: &CStmt, depth: usize, out: &mut Vec<String>) {
    let indent = INDENT.repeat(depth);
    match stmt {
        CStmt::Line(text) => out.push(format!("{}{}", indent, text)),
        CStmt::For { var, bound, body } => {
            let header = format!("for ({0}=0; {0}<{1}; ++{0})", var, bound);
            match body.as_slice() {
                [CStmt::Line(text)] => out.push(format!("{}{} {{ {} }}", indent, header, text)),
                _ => {
                    out.push(format!("{}{} {{", indent, header));
                    push_statements(body, depth + 1, out);
                    out.push(format!("{}}}", indent));
                }
            }
        }
        // Preprocessor lines always start in column 0
        CStmt::Guard { condition, then, otherwise } => {
            out.push(format!("#if {}", condition));
            push_statements(then, depth, out);
            if !otherwise.is_empty() {
                out.push("#else".to_string());
                push_statements(otherwise, depth, out);
            }
            out.push("#endif".to_string());
        }
    }
}

/// Render a complete function definition, preceded by a blank line.
pub fn render_function(function: &CFunction) -> String {
    let mut out = vec![
        String::new(),
        function.return_type.clone(),
        format!("{}({})", function.name, function.parameters),
        "{".to_string(),
        format!("{}{}", INDENT, LOOP_INDICES),
    ];
    out.extend(function.body.declarations.iter().map(|decl| format!("{}{}", INDENT, render_decl(decl))));

    for section in function.body.sections() {
        if section.is_empty() {
            continue;
        }
        out.push(String::new());
        push_statements(section, 1, &mut out);
    }
    out.push("}".to_string());

    let mut text = out.join("\n");
    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::FunctionBody;

    fn render_statements(statements: &[CStmt], depth: usize) -> Vec<String> {
        let mut out = Vec::new();
        push_statements(statements, depth, &mut out);
        out
    }

    #[test]
    fn declarations_attach_pointer_stars() {
        assert_eq!(render_decl(&CDecl::zeroed("void *", "c_SENDBUF")), "void *c_SENDBUF = 0;");
        assert_eq!(render_decl(&CDecl::new("MPI_Comm", "c_COMM")), "MPI_Comm c_COMM;");
        assert_eq!(render_decl(&CDecl::new("MPI_Count", "intval_N")), "MPI_Count intval_N;");
    }

    #[test]
    fn single_statement_loops_stay_on_one_line() {
        let lines = render_statements(
            &[CStmt::for_each('i', "intval_N", vec![CStmt::line("intval_DEGREES += DEGREES[i];")])],
            1,
        );
        assert_eq!(lines, vec!["    for (i=0; i<intval_N; ++i) { intval_DEGREES += DEGREES[i]; }"]);
    }

    #[test]
    fn nested_loops_open_a_block() {
        let inner = CStmt::for_each('j', "3", vec![CStmt::line("c_RANGES[3*i+j] = (int) RANGES[3*i+j];")]);
        let lines = render_statements(&[CStmt::for_each('i', "intval_N", vec![inner])], 1);
        assert_eq!(
            lines,
            vec![
                "    for (i=0; i<intval_N; ++i) {",
                "        for (j=0; j<3; ++j) { c_RANGES[3*i+j] = (int) RANGES[3*i+j]; }",
                "    }",
            ]
        );
    }

    #[test]
    fn guards_sit_in_column_zero() {
        let guard = CStmt::guard(
            "OMPI_SIZEOF_FORTRAN_INTEGER != SIZEOF_INT",
            vec![CStmt::line("c_N = (int) *N;")],
            vec![CStmt::line("c_N = *N;")],
        );
        let lines = render_statements(&[guard], 1);
        assert_eq!(
            lines,
            vec![
                "#if OMPI_SIZEOF_FORTRAN_INTEGER != SIZEOF_INT",
                "    c_N = (int) *N;",
                "#else",
                "    c_N = *N;",
                "#endif",
            ]
        );

        let no_else = render_statements(&[CStmt::guard("A != B", vec![CStmt::line("free(c_X);")], vec![])], 1);
        assert_eq!(no_else, vec!["#if A != B", "    free(c_X);", "#endif"]);
    }

    #[test]
    fn function_layout() {
        let body = FunctionBody {
            declarations: vec![CDecl::new("int", "c_ierr")],
            call: vec![CStmt::line("c_ierr = MPI_Barrier(c_COMM);")],
            ..FunctionBody::default()
        };
        let function = CFunction {
            return_type: "void".to_string(),
            name: "ompi_barrier_f".to_string(),
            parameters: "MPI_Fint *COMM, MPI_Fint *IERROR".to_string(),
            body,
        };

        let text = render_function(&function);
        assert!(text.starts_with("\nvoid\nompi_barrier_f(MPI_Fint *COMM, MPI_Fint *IERROR)\n{\n    MPI_Count i = 0, j = 0;\n    int c_ierr;\n\n"));
        assert!(text.ends_with("    c_ierr = MPI_Barrier(c_COMM);\n}\n"));
    }
}
