use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use tempfile::tempdir;

fn generator_cmd() -> Command {
    let mut cmd = Command::cargo_bin("mpifh-gen").expect("mpifh-gen binary");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn fixture(rel_path: &str) -> PathBuf {
    let manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest.join(rel_path)
}

fn spec_path() -> String {
    fixture("tests/fixtures/procedures.json").to_str().expect("utf8 path").to_string()
}

#[test]
fn smoke_help_and_version_commands() {
    generator_cmd().arg("--help").assert().success().stdout(contains("generate"));

    generator_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(contains("mpifh-gen "));
}

#[test]
fn generate_writes_units_and_prototypes() {
    let tempdir = tempdir().expect("tempdir");
    let out = tempdir.path().join("mpif-h");

    generator_cmd()
        .args(["generate", "--spec", &spec_path(), "--out", out.to_str().expect("utf8 path")])
        .assert()
        .success()
        .stdout(contains("Generated 4 units"));

    for unit in ["allgatherv_f.c", "dist_graph_create_f.c", "group_size_f.c", "wtime_f.c"] {
        assert!(out.join(unit).is_file(), "missing {}", unit);
    }

    let allgatherv = fs::read_to_string(out.join("allgatherv_f.c")).expect("read unit");
    assert!(allgatherv.starts_with("#include \"ompi_config.h\"\n"));
    assert!(allgatherv.contains("\nvoid\nompi_allgatherv_f("));
    assert!(allgatherv.contains("\nvoid\nompi_allgatherv_c_f("));
    assert!(!allgatherv.contains("FUNC_NAME"));
    assert!(allgatherv.contains("#define ompi_allgatherv_c_f pompi_allgatherv_c_f\n"));

    let prototypes = fs::read_to_string(out.join("prototypes_mpi_generated.h")).expect("read prototypes");
    assert_eq!(prototypes.lines().filter(|line| line.starts_with("OMPI_DECLSPEC")).count(), 58);
}

#[test]
fn generate_only_selected_procedures() {
    let tempdir = tempdir().expect("tempdir");
    let out = tempdir.path().to_str().expect("utf8 path").to_string();

    generator_cmd()
        .args(["generate", "--spec", &spec_path(), "--out", &out, "--only", "group_size"])
        .assert()
        .success()
        .stdout(contains("Generated 1 units"));

    assert!(tempdir.path().join("group_size_f.c").is_file());
    assert!(!tempdir.path().join("wtime_f.c").exists());
}

#[test]
fn show_prints_aliases_and_func_name() {
    generator_cmd()
        .args(["show", "--spec", &spec_path(), "MPI_GROUP_SIZE"])
        .assert()
        .success()
        .stdout(
            contains("#if OPAL_HAVE_WEAK_SYMBOLS // {")
                .and(contains("#pragma weak MPI_GROUP_SIZE = ompi_group_size_f"))
                .and(contains("static const char FUNC_NAME[] = \"MPI_GROUP_SIZE\";")),
        );
}

#[test]
fn show_with_stub_aliasing_forwards_calls() {
    generator_cmd()
        .args(["show", "--spec", &spec_path(), "--aliasing", "stubs", "group_size"])
        .assert()
        .success()
        .stdout(contains("{ ompi_group_size_f(").and(contains("#pragma weak").not()));
}

#[test]
fn prototypes_to_stdout_and_file() {
    generator_cmd()
        .args(["prototypes", "--spec", &spec_path()])
        .assert()
        .success()
        .stdout(contains("OMPI_DECLSPEC ompi_fortran_double_precision_t ompi_wtime_f(void);"));

    let tempdir = tempdir().expect("tempdir");
    let listing = tempdir.path().join("listing.h");
    generator_cmd()
        .args(["prototypes", "--spec", &spec_path(), "--out", listing.to_str().expect("utf8 path")])
        .assert()
        .success()
        .stdout(contains("OMPI_DECLSPEC").not());
    assert!(fs::read_to_string(&listing).expect("read listing").contains("pompi_dist_graph_create_f("));
}

#[test]
fn sizes_evaluate_against_sample_arguments() {
    generator_cmd()
        .args([
            "sizes",
            "--spec",
            &spec_path(),
            "dist_graph_create",
            "--value",
            "n=3",
            "--array",
            "DEGREES=2,1,4",
        ])
        .assert()
        .success()
        .stdout(contains("SOURCES = 3\n").and(contains("DESTINATIONS = 7\n")).and(contains("WEIGHTS = 7\n")));
}

#[test]
fn sizes_report_missing_samples() {
    generator_cmd()
        .args(["sizes", "--spec", &spec_path(), "allgatherv"])
        .assert()
        .failure()
        .stderr(contains("no sample value for COMM"));
}

#[test]
fn unknown_procedure_fails_with_message() {
    generator_cmd()
        .args(["show", "--spec", &spec_path(), "mpi_recv"])
        .assert()
        .failure()
        .stderr(contains("Error: unknown procedure mpi_recv"));
}

#[test]
fn platform_config_overrides_widths() {
    let tempdir = tempdir().expect("tempdir");
    let config = tempdir.path().join("platform.toml");
    fs::write(&config, "[widths]\n\"INTEGER\" = 8\n\"MPI_Fint\" = 8\n").expect("write config");

    generator_cmd()
        .args(["show", "--spec", &spec_path(), "--config", config.to_str().expect("utf8 path"), "dist_graph_create"])
        .assert()
        .success()
        .stdout(contains("malloc(").and(contains("free(")));
}

#[test]
fn missing_spec_file_is_reported() {
    generator_cmd()
        .args(["show", "--spec", "does/not/exist.json", "wtime"])
        .assert()
        .failure()
        .stderr(contains("failed to access does/not/exist.json"));
}
