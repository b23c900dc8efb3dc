/// Size Dependency Resolver
///
/// Three passes, each a pure function of the procedure and the previous pass:
/// 1. `tag_providers`: look up every array's formula and record which parameter
///    provides its length and what that provider must yield
/// 2. `resolve_scalar_providers`: dereference, communicator size, topology dimension
/// 3. `resolve_array_providers`: sums and last elements over already-resolved counts
///
/// The table is assumed acyclic; provider depth is at most array -> scalar.
use crate::error::GenError;
use crate::ir::{CDecl, CStmt};
use crate::model::{Dimensions, HandleCategory, ParamKind, Parameter, Procedure};
use crate::tables::{SizeFormula, SizeTable};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// What a provider parameter has to yield
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provision {
    Deref,
    CommSize,
    CartDim,
    FintSum { count: usize }, // Index of the driving scalar
    FintLast { count: usize },
}

/// Pass-1 output, indexed by parameter position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeRoles {
    pub provides: Vec<Option<Provision>>,
    pub consumes: Vec<Option<usize>>,
}

/// The name of the local holding a provider's resolved value.
pub fn length_var(param: &Parameter) -> String {
    format!("intval_{}", param.name)
}

/// Array-shaped parameters that need a length from the table.
pub fn needs_size(procedure: &Procedure, param: &Parameter) -> bool {
    param.dimensions.needs_length()
        && param.kind != ParamKind::Buffer
        && param.kind != ParamKind::Status
        && !param.is_error_code()
        && !SizeTable::is_exempt(procedure, &param.name)
}

fn is_scalar_communicator(param: &Parameter) -> bool {
    param.kind == ParamKind::Handle(HandleCategory::Communicator) && param.dimensions.is_scalar()
}

struct Tagger<'a> {
    procedure: &'a Procedure,
    roles: SizeRoles,
}

impl<'a> Tagger<'a> {
    fn index(&self, name: &str, referenced_by: &str) -> Result<usize, GenError> {
        self.procedure.position(name).ok_or_else(|| GenError::MissingParameter {
            procedure: self.procedure.name.clone(),
            parameter: name.to_string(),
            referenced_by: referenced_by.to_string(),
        })
    }

    fn provide(&mut self, index: usize, provision: Provision) -> Result<(), GenError> {
        let param = &self.procedure.parameters[index];
        let shape_ok = match provision {
            Provision::Deref => param.dimensions.is_scalar() && param.kind.is_integral(),
            Provision::CommSize | Provision::CartDim => is_scalar_communicator(param),
            Provision::FintSum { .. } | Provision::FintLast { .. } => {
                param.dimensions == Dimensions::Array && param.kind.is_integral()
            }
        };
        if !shape_ok {
            return Err(GenError::shape(
                &self.procedure.name,
                &param.name,
                format!("{:?} cannot provide {:?}", param.kind, provision),
            ));
        }

        if let Some(existing) = &self.roles.provides[index] {
            if *existing != provision {
                return Err(GenError::shape(
                    &self.procedure.name,
                    &param.name,
                    format!("provides both {:?} and {:?}", existing, provision),
                ));
            }
        }
        self.roles.provides[index] = Some(provision);
        Ok(())
    }
}

/// Pass 1: tag providers and consumers.
pub fn tag_providers(procedure: &Procedure, table: &SizeTable) -> Result<SizeRoles, GenError> {
    let count = procedure.parameters.len();
    let mut tagger = Tagger { procedure, roles: SizeRoles { provides: vec![None; count], consumes: vec![None; count] } };

    for (index, param) in procedure.parameters.iter().enumerate() {
        if !needs_size(procedure, param) {
            continue;
        }
        let formula = table.lookup(procedure, &param.name).ok_or_else(|| GenError::MissingSize {
            procedure: procedure.name.clone(),
            parameter: param.name.clone(),
        })?;
        debug!(procedure = %procedure.name, parameter = %param.name, formula = %formula, "size formula");

        let provider = match formula {
            SizeFormula::Deref(name) => {
                let provider = tagger.index(name, &param.name)?;
                tagger.provide(provider, Provision::Deref)?;
                provider
            }
            SizeFormula::CommSize(name) => {
                let provider = tagger.index(name, &param.name)?;
                tagger.provide(provider, Provision::CommSize)?;
                provider
            }
            SizeFormula::CartDim(name) => {
                let provider = tagger.index(name, &param.name)?;
                tagger.provide(provider, Provision::CartDim)?;
                provider
            }
            SizeFormula::FintSum { array, count } | SizeFormula::FintLast { array, count } => {
                let scalar = tagger.index(count, &param.name)?;
                let provider = tagger.index(array, &param.name)?;
                tagger.provide(scalar, Provision::Deref)?;
                let provision = match formula {
                    SizeFormula::FintSum { .. } => Provision::FintSum { count: scalar },
                    _ => Provision::FintLast { count: scalar },
                };
                tagger.provide(provider, provision)?;
                provider
            }
        };
        tagger.roles.consumes[index] = Some(provider);
    }

    Ok(tagger.roles)
}

/// Pass 2: scalar providers, emitted before any array is touched.
pub fn resolve_scalar_providers(procedure: &Procedure, roles: &SizeRoles) -> Vec<CStmt> {
    let mut statements = Vec::new();
    for (param, provision) in procedure.parameters.iter().zip(&roles.provides) {
        let var = length_var(param);
        let statement = match provision {
            Some(Provision::Deref) => format!("{} = *{};", var, param.name),
            Some(Provision::CommSize) => format!("MPI_Comm_size(c_{}, &{});", param.name, var),
            Some(Provision::CartDim) => format!("MPI_Cartdim_get(c_{}, &{});", param.name, var),
            _ => continue,
        };
        statements.push(CStmt::line(statement));
    }
    statements
}

/// Pass 3: array providers, reading the scalars resolved by pass 2.
pub fn resolve_array_providers(procedure: &Procedure, roles: &SizeRoles) -> Vec<CStmt> {
    let mut statements = Vec::new();
    for (param, provision) in procedure.parameters.iter().zip(&roles.provides) {
        let var = length_var(param);
        match provision {
            Some(Provision::FintSum { count }) => {
                let bound = length_var(&procedure.parameters[*count]);
                statements.push(CStmt::line(format!("{} = 0;", var)));
                statements.push(CStmt::for_each(
                    'i',
                    bound,
                    vec![CStmt::line(format!("{} += {}[i];", var, param.name))],
                ));
            }
            Some(Provision::FintLast { count }) => {
                let bound = length_var(&procedure.parameters[*count]);
                statements.push(CStmt::line(format!("{} = {}[{} - 1];", var, param.name, bound)));
            }
            _ => {}
        }
    }
    statements
}

/// Every size-related fact for one procedure
#[derive(Debug, Clone, PartialEq)]
pub struct SizePlan {
    pub roles: SizeRoles,
    pub locals: Vec<CDecl>,
    pub scalar_statements: Vec<CStmt>,
    pub array_statements: Vec<CStmt>,
}

pub fn resolve_sizes(procedure: &Procedure, table: &SizeTable) -> Result<SizePlan, GenError> {
    let roles = tag_providers(procedure, table)?;

    // commsize and cartdim take plain ints; every other count is an MPI_Count
    let locals = procedure
        .parameters
        .iter()
        .zip(&roles.provides)
        .filter_map(|(param, provision)| {
            let ty = match provision.as_ref()? {
                Provision::CommSize | Provision::CartDim => "int",
                _ => "MPI_Count",
            };
            Some(CDecl::new(ty, length_var(param)))
        })
        .collect();

    let scalar_statements = resolve_scalar_providers(procedure, &roles);
    let array_statements = resolve_array_providers(procedure, &roles);
    Ok(SizePlan { roles, locals, scalar_statements, array_statements })
}

/// Argument values to evaluate a size plan against
#[derive(Debug, Clone, Default)]
pub struct SampleArgs {
    pub scalars: HashMap<String, i64>,
    pub arrays: HashMap<String, Vec<i64>>,
    pub comm_sizes: HashMap<String, i64>,
    pub cart_dims: HashMap<String, i64>,
}

/// Result of evaluating a size plan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeValues {
    pub provided: BTreeMap<String, i64>, // provider name -> value of its intval local
    pub lengths: BTreeMap<String, i64>,  // consumer name -> resolved element count
}

impl SizePlan {
    pub fn length_var_for(&self, procedure: &Procedure, index: usize) -> Option<String> {
        let provider = self.roles.consumes.get(index).copied().flatten()?;
        Some(length_var(&procedure.parameters[provider]))
    }

    /// Evaluate the plan the way the emitted statements would: pass 2, then pass 3.
    pub fn evaluate(&self, procedure: &Procedure, args: &SampleArgs) -> Result<SizeValues, GenError> {
        let missing = |what: String| GenError::MissingSample(what);
        let mut values = SizeValues::default();
        let mut resolved: Vec<Option<i64>> = vec![None; procedure.parameters.len()];

        for (index, (param, provision)) in procedure.parameters.iter().zip(&self.roles.provides).enumerate() {
            let samples = match provision {
                Some(Provision::Deref) => &args.scalars,
                Some(Provision::CommSize) => &args.comm_sizes,
                Some(Provision::CartDim) => &args.cart_dims,
                _ => continue,
            };
            let value = *samples.get(&param.name).ok_or_else(|| missing(param.name.clone()))?;
            resolved[index] = Some(value);
        }

        for (index, (param, provision)) in procedure.parameters.iter().zip(&self.roles.provides).enumerate() {
            let (count, last) = match provision {
                Some(Provision::FintSum { count }) => (*count, false),
                Some(Provision::FintLast { count }) => (*count, true),
                _ => continue,
            };
            let bound = resolved[count].ok_or_else(|| missing(procedure.parameters[count].name.clone()))?;
            let array = args.arrays.get(&param.name).ok_or_else(|| missing(param.name.clone()))?;
            let element = |i: i64| {
                usize::try_from(i)
                    .ok()
                    .and_then(|i| array.get(i).copied())
                    .ok_or_else(|| missing(format!("{}[{}]", param.name, i)))
            };

            let overflow = || GenError::SizeOverflow { procedure: procedure.name.clone(), parameter: param.name.clone() };
            let value = if last {
                element(bound.checked_sub(1).ok_or_else(overflow)?)?
            } else {
                let mut sum: i64 = 0;
                for i in 0..bound {
                    sum = sum.checked_add(element(i)?).ok_or_else(overflow)?;
                }
                sum
            };
            resolved[index] = Some(value);
        }

        for (index, param) in procedure.parameters.iter().enumerate() {
            if let Some(value) = resolved[index] {
                values.provided.insert(param.name.clone(), value);
            }
            if let Some(provider) = self.roles.consumes[index] {
                if let Some(value) = resolved[provider] {
                    values.lengths.insert(param.name.clone(), value);
                }
            }
        }
        Ok(values)
    }
}
