/// Compiler module - turns a procedure description into a function body IR
///
/// This module is organized into:
/// - context: GenerationContext, the per-procedure working state
/// - width: picks the narrow or wide target interface
/// - sizing: the three size passes (tag providers, scalar providers, array providers)
/// - plan: per-parameter conversion plans
mod context;
mod plan;
mod sizing;
mod width;

pub use context::{ConversionMode, GenerationContext};
pub use plan::{Conversion, ParameterPlan};
pub use sizing::{resolve_sizes, SampleArgs};

use crate::codegen::AliasMode;
use crate::error::GenError;
use crate::ir::{CDecl, CStmt, FunctionBody};
use crate::model::{Procedure, Width};
use crate::tables::{return_c_type, SizeTable, TypeWidths};
use tracing::debug;

/// Switches that change what gets emitted without changing the inputs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationOptions {
    pub aliasing: AliasMode,
    pub mode: ConversionMode,
    /// Fail instead of warning when a promoted call has an integral parameter with no wide type.
    pub strict_wide_descriptors: bool,
}

/// Everything needed to compile any procedure of the database
#[derive(Debug, Clone)]
pub struct Generator {
    pub widths: TypeWidths,
    pub sizes: SizeTable,
    pub options: GenerationOptions,
}

impl Generator {
    pub fn new(widths: TypeWidths, sizes: SizeTable, options: GenerationOptions) -> Self {
        Self { widths, sizes, options }
    }

    pub fn context<'a>(&'a self, procedure: &'a Procedure, source_width: Width) -> Result<GenerationContext<'a>, GenError> {
        GenerationContext::new(
            procedure,
            source_width,
            &self.widths,
            &self.sizes,
            self.options.mode,
            self.options.strict_wide_descriptors,
        )
    }
}

/// The call, its declarations and whatever follows it, eg `c_ierr = MPI_Send(...);`
fn assemble_call(ctx: &GenerationContext, plans: &[ParameterPlan], body: &mut FunctionBody) -> Result<(), GenError> {
    let arguments: Vec<&str> = plans.iter().filter_map(|plan| plan.call_arg.as_deref()).collect();
    let invocation = format!("{}({})", ctx.target_call_name(), arguments.join(", "));

    if let Some(kind) = &ctx.procedure.return_kind {
        let c_type = return_c_type(kind).ok_or_else(|| GenError::MissingReturnType {
            procedure: ctx.procedure.name.clone(),
            type_tag: kind.clone(),
        })?;
        body.declarations.push(CDecl::new(c_type, "rv"));
        body.call.push(CStmt::line(format!("rv = {};", invocation)));
        body.epilogue.push(CStmt::line("return rv;"));
    } else if let Some(ierror) = ctx.procedure.parameters.iter().find(|param| param.is_error_code()) {
        body.declarations.push(CDecl::new("int", "c_ierr"));
        body.call.push(CStmt::line(format!("c_ierr = {};", invocation)));
        body.epilogue.push(CStmt::line(format!(
            "if (NULL != {0}) *{0} = OMPI_INT_2_FINT(c_ierr);",
            ierror.name
        )));
    } else {
        body.call.push(CStmt::line(format!("{};", invocation)));
    }
    Ok(())
}

/// Compile one procedure at the context's source width into a function body.
pub fn compile_body(ctx: &GenerationContext) -> Result<FunctionBody, GenError> {
    let sizes = resolve_sizes(ctx.procedure, ctx.sizes)?;
    let plans = plan::build_plans(ctx, &sizes)?;

    let mut body = FunctionBody::default();
    body.declarations.extend(plans.iter().filter_map(|plan| plan.local.clone()));
    body.declarations.extend(sizes.locals.iter().cloned());

    for plan in &plans {
        let section = if plan.early { &mut body.early_conversions } else { &mut body.conversions };
        section.extend(plan.inbound.iter().cloned());
        body.write_backs.extend(plan.write_back.iter().cloned());
        body.cleanup.extend(plan.cleanup.iter().cloned());
    }
    body.scalar_sizes = sizes.scalar_statements;
    body.array_sizes = sizes.array_statements;

    assemble_call(ctx, &plans, &mut body)?;

    debug!(
        procedure = %ctx.procedure.name,
        source = ?ctx.source_width,
        target = ?ctx.target_width,
        converted = plans.iter().filter(|plan| plan.conversion != Conversion::Never).count(),
        "compiled body"
    );
    Ok(body)
}
