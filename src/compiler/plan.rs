/// Conversion Plan Builder
///
/// Decides, per parameter and in declared order, the target-side local, the
/// statements that fill it before the call, the write-back after the call and
/// the expression handed to the target call.
use super::context::{ConversionMode, GenerationContext};
use super::sizing::SizePlan;
use crate::error::GenError;
use crate::ir::{CDecl, CStmt};
use crate::model::{Dimensions, HandleCategory, ParamKind, Parameter, TargetDecl};
use crate::tables::{handle_conversion, in_place_position, source_c_type};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    Always,
    Never,
    /// Converted only when the two widths differ, under a preprocessor guard
    Conditional,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterPlan {
    pub name: String,
    pub local: Option<CDecl>,
    pub conversion: Conversion,
    pub length_var: Option<String>,
    pub inbound: Vec<CStmt>,
    pub write_back: Vec<CStmt>,
    pub cleanup: Vec<CStmt>,
    pub call_arg: Option<String>, // None for the error code
    pub early: bool,              // Converted before the size passes run
}

impl ParameterPlan {
    fn new(param: &Parameter, length_var: Option<String>) -> Self {
        Self {
            name: param.name.clone(),
            local: None,
            conversion: Conversion::Never,
            length_var,
            inbound: Vec::new(),
            write_back: Vec::new(),
            cleanup: Vec::new(),
            call_arg: None,
            early: false,
        }
    }
}

pub fn build_plans(ctx: &GenerationContext, sizes: &SizePlan) -> Result<Vec<ParameterPlan>, GenError> {
    ctx.procedure
        .parameters
        .iter()
        .enumerate()
        .map(|(index, param)| {
            let mut planner = Planner {
                ctx,
                param,
                index,
                local: format!("c_{}", param.name),
                plan: ParameterPlan::new(param, sizes.length_var_for(ctx.procedure, index)),
            };
            planner.run()?;
            Ok(planner.plan)
        })
        .collect()
}

struct Planner<'c, 'a> {
    ctx: &'c GenerationContext<'a>,
    param: &'a Parameter,
    index: usize,
    local: String,
    plan: ParameterPlan,
}

impl<'c, 'a> Planner<'c, 'a> {
    fn run(&mut self) -> Result<(), GenError> {
        if self.param.is_error_code() {
            return Ok(());
        }

        match &self.param.kind {
            ParamKind::Buffer => self.buffer(),
            ParamKind::Handle(category) => self.handle(*category)?,
            ParamKind::Integer | ParamKind::Logical | ParamKind::TransferCount => self.integral()?,
            ParamKind::String => self.string()?,
            ParamKind::StringArray => self.string_array()?,
            ParamKind::StringArrayArray => self.string_array_array()?,
            ParamKind::Status => self.status()?,
            ParamKind::Callback(_) | ParamKind::State => self.pass_through()?,
        }
        Ok(())
    }

    fn unrecognized(&self, descriptor: impl Into<String>) -> GenError {
        GenError::shape(&self.ctx.procedure.name, &self.param.name, descriptor)
    }

    fn unrecognized_dimensions(&self) -> GenError {
        self.unrecognized(format!("{:?} with dimensions {}", self.param.kind, self.param.dimensions))
    }

    fn target_decl(&self) -> Result<&'a TargetDecl, GenError> {
        self.param.call.as_ref().ok_or_else(|| self.unrecognized("no target declaration"))
    }

    /// Scalars go by address exactly when the target declares a pointer to the base type.
    fn scalar_call_arg(&self) -> Result<String, GenError> {
        let decl = self.target_decl()?;
        if decl.is_pointer_to_base() {
            Ok(format!("&{}", self.local))
        } else if decl.is_base() {
            Ok(self.local.clone())
        } else {
            Err(self.unrecognized(format!("target type {} over base type {}", decl.ty, decl.base_type)))
        }
    }

    fn required_length(&self) -> Result<String, GenError> {
        self.plan.length_var.clone().ok_or_else(|| GenError::MissingSize {
            procedure: self.ctx.procedure.name.clone(),
            parameter: self.param.name.clone(),
        })
    }

    fn buffer(&mut self) {
        let name = &self.param.name;
        self.plan.local = Some(CDecl::zeroed("void *", &self.local));
        if in_place_position(self.ctx.procedure) == Some(self.index) {
            self.plan.inbound.push(CStmt::line(format!("{} = (void *) OMPI_F2C_IN_PLACE({});", self.local, name)));
            self.plan.inbound.push(CStmt::line(format!("{0} = (void *) OMPI_F2C_BOTTOM({0});", self.local)));
        } else {
            self.plan.inbound.push(CStmt::line(format!("{} = (void *) OMPI_F2C_BOTTOM({});", self.local, name)));
        }
        self.plan.call_arg = Some(self.local.clone());
    }

    fn handle(&mut self, category: HandleCategory) -> Result<(), GenError> {
        let conversion = handle_conversion(category).ok_or_else(|| GenError::MissingHandle {
            procedure: self.ctx.procedure.name.clone(),
            parameter: self.param.name.clone(),
        })?;
        let (name, local, direction) = (&self.param.name, &self.local, self.param.direction);
        self.plan.conversion = Conversion::Always;

        match self.param.dimensions {
            Dimensions::Scalar => {
                self.plan.local = Some(CDecl::new(conversion.c_type, local));
                if direction.reads() {
                    self.plan.inbound.push(CStmt::line(format!("{} = {}(*{});", local, conversion.f2c, name)));
                }
                if direction.writes() {
                    self.plan.write_back.push(CStmt::line(format!("*{} = {}({});", name, conversion.c2f, local)));
                }
                self.plan.early = category == HandleCategory::Communicator && direction.reads();
                self.plan.call_arg = Some(self.scalar_call_arg()?);
            }
            Dimensions::Array => {
                let length = self.required_length()?;
                let c_type = conversion.c_type;
                self.plan.local = Some(CDecl::zeroed(format!("{} *", c_type), local));
                self.plan.inbound.push(CStmt::line(format!(
                    "{} = ({} *) malloc({} * sizeof({}));",
                    local, c_type, length, c_type
                )));
                if direction.reads() {
                    let copy = format!("{}[i] = {}({}[i]);", local, conversion.f2c, name);
                    self.plan.inbound.push(CStmt::for_each('i', &length, vec![CStmt::line(copy)]));
                }
                if direction.writes() {
                    let copy = format!("{}[i] = {}({}[i]);", name, conversion.c2f, local);
                    self.plan.write_back.push(CStmt::for_each('i', &length, vec![CStmt::line(copy)]));
                }
                self.plan.cleanup.push(CStmt::line(format!("free({});", local)));
                self.plan.call_arg = Some(local.clone());
            }
            _ => return Err(self.unrecognized_dimensions()),
        }
        Ok(())
    }

    fn integral(&mut self) -> Result<(), GenError> {
        let ctx = self.ctx;
        let source_tag = ctx.source_tag(self.param);
        let target_tag = ctx.target_tag(self.param);
        let source_bytes = ctx.width_of(self.param, source_tag)?;
        let target_bytes = ctx.width_of(self.param, target_tag)?;

        self.plan.conversion = match ctx.mode {
            ConversionMode::Sized if source_bytes == target_bytes => Conversion::Never,
            _ => Conversion::Conditional,
        };
        let condition = format!(
            "{} != {}",
            ctx.widths.guard_operand(source_tag).unwrap_or_else(|| source_bytes.to_string()),
            ctx.widths.guard_operand(target_tag).unwrap_or_else(|| target_bytes.to_string()),
        );

        let c_type = target_tag;
        let f_type = source_c_type(source_tag);
        let logical = self.param.kind == ParamKind::Logical;
        let to_c = |expr: &str| {
            if logical {
                format!("OMPI_LOGICAL_2_INT({})", expr)
            } else {
                format!("({}) {}", c_type, expr)
            }
        };
        let to_f = |expr: &str| {
            if logical {
                format!("OMPI_INT_2_LOGICAL({})", expr)
            } else {
                format!("({}) {}", f_type, expr)
            }
        };

        let (name, local, direction) = (&self.param.name, self.local.clone(), self.param.direction);
        let stride = match self.param.dimensions {
            Dimensions::Scalar => {
                if self.plan.conversion == Conversion::Never {
                    let decl = self.target_decl()?;
                    self.plan.call_arg = Some(if decl.is_pointer_to_base() {
                        format!("({} *) {}", c_type, name)
                    } else if decl.is_base() {
                        format!("({}) *{}", c_type, name)
                    } else {
                        return Err(self.unrecognized(format!("target type {} over base type {}", decl.ty, decl.base_type)));
                    });
                    return Ok(());
                }

                self.plan.local = Some(CDecl::zeroed(c_type, &local));
                if direction.reads() {
                    self.plan.inbound.push(CStmt::guard(
                        &condition,
                        vec![CStmt::line(format!("{} = {};", local, to_c(&format!("*{}", name))))],
                        vec![CStmt::line(format!("{} = *{};", local, name))],
                    ));
                }
                if direction.writes() {
                    self.plan.write_back.push(CStmt::line(format!("*{} = {};", name, to_f(&local))));
                }
                self.plan.call_arg = Some(self.scalar_call_arg()?);
                return Ok(());
            }
            Dimensions::Array => None,
            Dimensions::Fixed { inner } => Some(inner),
            _ => return Err(self.unrecognized_dimensions()),
        };

        let pointer_cast = match stride {
            Some(inner) => format!("({} (*)[{}])", c_type, inner),
            None => format!("({} *)", c_type),
        };
        if self.plan.conversion == Conversion::Never {
            self.plan.call_arg = Some(format!("{} {}", pointer_cast, name));
            return Ok(());
        }

        let length = self.required_length()?;
        let elements = match stride {
            Some(inner) => format!("{} * {}", length, inner),
            None => length.clone(),
        };
        self.plan.local = Some(CDecl::zeroed(format!("{} *", c_type), &local));

        let mut convert = vec![CStmt::line(format!(
            "{} = ({} *) malloc({} * sizeof({}));",
            local, c_type, elements, c_type
        ))];
        if direction.reads() {
            convert.push(copy_loop(&length, stride, |at, source| {
                format!("{}[{}] = {};", local, at, to_c(&format!("{}{}", name, source)))
            }));
        }
        self.plan.inbound.push(CStmt::guard(
            &condition,
            convert,
            vec![CStmt::line(format!("{} = ({} *) {};", local, c_type, name))],
        ));
        if direction.writes() {
            let back = copy_loop(&length, stride, |at, source| {
                format!("{}{} = {};", name, source, to_f(&format!("{}[{}]", local, at)))
            });
            self.plan.write_back.push(CStmt::guard(&condition, vec![back], vec![]));
        }
        self.plan.cleanup.push(CStmt::guard(&condition, vec![CStmt::line(format!("free({});", local))], vec![]));
        self.plan.call_arg = Some(match stride {
            Some(_) => format!("{} {}", pointer_cast, local),
            None => local,
        });
        Ok(())
    }

    fn string(&mut self) -> Result<(), GenError> {
        if !self.param.dimensions.is_scalar() {
            return Err(self.unrecognized_dimensions());
        }
        let (name, local, direction) = (&self.param.name, &self.local, self.param.direction);
        self.plan.conversion = Conversion::Always;
        self.plan.local = Some(CDecl::zeroed("char *", local));
        if direction.reads() {
            self.plan.inbound.push(CStmt::line(format!("ompi_fortran_string_f2c({0}, {0}_len, &{1});", name, local)));
        } else {
            self.plan.inbound.push(CStmt::line(format!("{} = (char *) malloc({}_len + 1);", local, name)));
        }
        if direction.writes() {
            self.plan.write_back.push(CStmt::line(format!("ompi_fortran_string_c2f({1}, {0}, {0}_len);", name, local)));
        }
        self.plan.cleanup.push(CStmt::line(format!("free({});", local)));
        self.plan.call_arg = Some(local.clone());
        Ok(())
    }

    fn string_array(&mut self) -> Result<(), GenError> {
        if self.param.dimensions.is_scalar() || self.param.direction.writes() {
            return Err(self.unrecognized_dimensions());
        }
        let (name, local) = (&self.param.name, &self.local);
        self.plan.conversion = Conversion::Always;
        self.plan.local = Some(CDecl::zeroed("char **", local));
        // Without a count the array is terminated by a blank entry.
        let convert = match &self.plan.length_var {
            Some(length) => format!("ompi_fortran_argv_count_f2c({0}, {2}, {0}_len, {0}_len, &{1});", name, local, length),
            None => format!("ompi_fortran_argv_blank_f2c({0}, {0}_len, {0}_len, &{1});", name, local),
        };
        self.plan.inbound.push(CStmt::line(convert));
        self.plan.cleanup.push(CStmt::line(format!("opal_argv_free({});", local)));
        self.plan.call_arg = Some(local.clone());
        Ok(())
    }

    fn string_array_array(&mut self) -> Result<(), GenError> {
        if self.param.dimensions.is_scalar() || self.param.direction.writes() {
            return Err(self.unrecognized_dimensions());
        }
        let length = self.required_length()?;
        let (name, local) = (&self.param.name, &self.local);
        self.plan.conversion = Conversion::Always;
        self.plan.local = Some(CDecl::zeroed("char ***", local));
        self.plan.inbound.push(CStmt::line(format!(
            "ompi_fortran_multiple_argv_f2c({}, {}, {}_len, &{});",
            length, name, name, local
        )));
        self.plan.cleanup.push(CStmt::for_each('i', &length, vec![CStmt::line(format!("opal_argv_free({}[i]);", local))]));
        self.plan.cleanup.push(CStmt::line(format!("free({});", local)));
        self.plan.call_arg = Some(local.clone());
        Ok(())
    }

    fn status(&mut self) -> Result<(), GenError> {
        match self.param.dimensions {
            Dimensions::Status | Dimensions::StatusArray => {
                self.plan.call_arg = Some(format!("(MPI_Status *) {}", self.param.name));
                Ok(())
            }
            _ => Err(self.unrecognized_dimensions()),
        }
    }

    /// Callbacks and opaque state are layout-compatible; only a cast is needed.
    fn pass_through(&mut self) -> Result<(), GenError> {
        let decl = self.target_decl()?;
        let name = &self.param.name;
        let arg = if decl.is_base() {
            format!("({}) *{}", decl.base_type, name)
        } else if decl.is_pointer_to_base() {
            format!("({}) {}", decl.ty, name)
        } else {
            return Err(self.unrecognized(format!("target type {} over base type {}", decl.ty, decl.base_type)));
        };
        self.plan.call_arg = Some(arg);
        Ok(())
    }
}

/// Element-wise copy over a resolved length; fixed-width rows get an inner loop.
/// Element copy between the flat local and the caller's array. `assign` gets the
/// flat local index and the caller-side subscript, eg `3*i+j` and `[i][j]`.
fn copy_loop(length: &str, stride: Option<u32>, assign: impl Fn(&str, &str) -> String) -> CStmt {
    match stride {
        None => CStmt::for_each('i', length, vec![CStmt::line(assign("i", "[i]"))]),
        Some(inner) => {
            let at = format!("{}*i+j", inner);
            let row = CStmt::for_each('j', inner.to_string(), vec![CStmt::line(assign(&at, "[i][j]"))]);
            CStmt::for_each('i', length, vec![row])
        }
    }
}
