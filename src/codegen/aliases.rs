/// Entry-Point Alias Emitter
///
/// Every procedure is reachable under four decorated source-convention names
/// (upper case, then lower case with zero, one and two trailing underscores)
/// and two modern-binding names, once for the primary build and once for the
/// profiling shadow build.
use super::backend::AliasMode;
use super::signature::Signature;
use crate::model::{Procedure, Width};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    Primary,
    /// Profiling build; every name carries a `p` prefix
    Shadow,
}

impl BuildMode {
    fn prefix(self) -> &'static str {
        match self {
            BuildMode::Primary => "",
            BuildMode::Shadow => "p",
        }
    }
}

/// External names of one procedure in one build mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoints {
    pub canonical: String,
    pub decorated: [String; 4],
    pub modern: [String; 2],
}

impl EntryPoints {
    pub fn for_procedure(procedure: &Procedure, build: BuildMode) -> Self {
        let lower = format!("{}mpi_{}", build.prefix(), procedure.suffix());
        let upper = lower.to_uppercase();
        let modern = format!("{}MPI_{}", build.prefix().to_uppercase(), procedure.capitalized_suffix());
        EntryPoints {
            canonical: canonical_name(procedure, build, Width::Narrow),
            decorated: [upper, lower.clone(), format!("{}_", lower), format!("{}__", lower)],
            modern: [format!("{}_f", modern), format!("{}_f08", modern)],
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.decorated.iter().chain(self.modern.iter()).map(String::as_str)
    }
}

/// The function a build's entry points resolve to, eg `pompi_send_c_f`.
pub fn canonical_name(procedure: &Procedure, build: BuildMode, width: Width) -> String {
    let long = if width == Width::Wide { "_c" } else { "" };
    format!("{}ompi_{}{}_f", build.prefix(), procedure.suffix(), long)
}

/// The block heading a unit: both build modes, the chosen strategy inside each,
/// and the shadow build's rename of the canonical definition.
pub fn alias_block(procedure: &Procedure, signature: &Signature, mode: AliasMode) -> Vec<String> {
    let strategy = mode.strategy(signature);
    let mut out = vec!["#if ! OMPI_BUILD_MPI_PROFILING // {".to_string()];
    strategy.emit(&EntryPoints::for_procedure(procedure, BuildMode::Primary), &mut out);
    out.push("#else // }{".to_string());
    strategy.emit(&EntryPoints::for_procedure(procedure, BuildMode::Shadow), &mut out);
    let widths: &[Width] = if procedure.has_long_interface() { &[Width::Narrow, Width::Wide] } else { &[Width::Narrow] };
    for &width in widths {
        out.push(format!(
            "#define {} {}",
            canonical_name(procedure, BuildMode::Primary, width),
            canonical_name(procedure, BuildMode::Shadow, width)
        ));
    }
    out.push("#endif // }".to_string());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures;
    use std::collections::HashSet;

    #[test]
    fn names_in_both_builds() {
        let procedure = fixtures::allgatherv();
        let primary = EntryPoints::for_procedure(&procedure, BuildMode::Primary);
        let shadow = EntryPoints::for_procedure(&procedure, BuildMode::Shadow);

        assert_eq!(
            primary.names().collect::<Vec<_>>(),
            vec!["MPI_ALLGATHERV", "mpi_allgatherv", "mpi_allgatherv_", "mpi_allgatherv__", "MPI_Allgatherv_f", "MPI_Allgatherv_f08"]
        );
        assert_eq!(shadow.canonical, "pompi_allgatherv_f");
        assert_eq!(shadow.decorated[0], "PMPI_ALLGATHERV");
        assert_eq!(shadow.modern[1], "PMPI_Allgatherv_f08");
    }

    #[test]
    fn shadow_names_are_disjoint_from_primary() {
        let procedure = fixtures::dist_graph_create();
        let primary: HashSet<String> = EntryPoints::for_procedure(&procedure, BuildMode::Primary).names().map(String::from).collect();
        let shadow: HashSet<String> = EntryPoints::for_procedure(&procedure, BuildMode::Shadow).names().map(String::from).collect();
        assert_eq!(primary.len(), 6);
        assert!(primary.is_disjoint(&shadow));
    }

    #[test]
    fn every_alias_resolves_to_its_build_canonical() {
        let procedure = fixtures::win_fence();
        let signature = Signature::for_procedure(&procedure, Width::Narrow).unwrap();
        let block = alias_block(&procedure, &signature, AliasMode::Weak);

        let split = block.iter().position(|line| line == "#else // }{").unwrap();
        for line in block[..split].iter().filter(|line| line.starts_with("#pragma weak")) {
            assert!(line.ends_with("= ompi_win_fence_f"), "{}", line);
        }
        for line in block[split..].iter().filter(|line| line.starts_with("#pragma weak")) {
            assert!(line.ends_with("= pompi_win_fence_f"), "{}", line);
        }
        assert_eq!(block[block.len() - 2], "#define ompi_win_fence_f pompi_win_fence_f");
        assert_eq!(block.first().map(String::as_str), Some("#if ! OMPI_BUILD_MPI_PROFILING // {"));
        assert_eq!(block.last().map(String::as_str), Some("#endif // }"));
    }

    #[test]
    fn long_interface_canonical() {
        let procedure = fixtures::allgatherv();
        assert_eq!(canonical_name(&procedure, BuildMode::Primary, Width::Wide), "ompi_allgatherv_c_f");
        assert_eq!(canonical_name(&procedure, BuildMode::Shadow, Width::Wide), "pompi_allgatherv_c_f");
    }

    #[test]
    fn shadow_build_renames_the_long_interface_too() {
        let procedure = fixtures::allgatherv();
        let signature = Signature::for_procedure(&procedure, Width::Narrow).unwrap();
        let block = alias_block(&procedure, &signature, AliasMode::Weak);
        let defines: Vec<&str> = block.iter().map(String::as_str).filter(|line| line.starts_with("#define")).collect();
        assert_eq!(
            defines,
            vec!["#define ompi_allgatherv_f pompi_allgatherv_f", "#define ompi_allgatherv_c_f pompi_allgatherv_c_f"]
        );

        let split = block.iter().position(|line| line == "#else // }{").unwrap();
        assert!(block[..split].iter().all(|line| !line.starts_with("#define")));
    }
}
