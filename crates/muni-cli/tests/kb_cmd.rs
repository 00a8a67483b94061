//! Integration tests for the kb commands and local-store ask path.

use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

const LICENCIA: &str = "\
Titulo: Licencia de funcionamiento
Código: LF-001
Descripción del Servicio: Autorización municipal para operar un establecimiento comercial.
Requisitos:
1.- Solicitud firmada
2.- Copia de DNI
Plazo: 15 días hábiles
";

const CONSTANCIA: &str = "\
Titulo: Constancia de posesión
Código: CP-002
Descripción del Servicio: Constancia para acreditar la posesión de un predio.
Plazo: 5 días hábiles
";

fn write_procedures(home: &Path) {
    let kb_dir = home.join("procedures");
    fs::create_dir_all(&kb_dir).unwrap();
    fs::write(kb_dir.join("licencia.txt"), LICENCIA).unwrap();
    fs::write(kb_dir.join("constancia.txt"), CONSTANCIA).unwrap();
}

#[test]
fn test_kb_list_shows_titles_sorted() {
    let home = tempdir().unwrap();
    write_procedures(home.path());

    cargo_bin_cmd!("muni")
        .env("MUNI_HOME", home.path())
        .args(["kb", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Licencia de funcionamiento"))
        .stdout(predicate::str::contains("Constancia de posesión"));
}

#[test]
fn test_kb_list_empty_store() {
    let home = tempdir().unwrap();

    cargo_bin_cmd!("muni")
        .env("MUNI_HOME", home.path())
        .args(["kb", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No procedures found"));
}

#[test]
fn test_kb_show_by_title_and_code() {
    let home = tempdir().unwrap();
    write_procedures(home.path());

    cargo_bin_cmd!("muni")
        .env("MUNI_HOME", home.path())
        .args(["kb", "show", "licencia de funcionamiento"])
        .assert()
        .success()
        .stdout(predicate::str::contains("**Código:** LF-001"))
        .stdout(predicate::str::contains("- 1.- Solicitud firmada"));

    cargo_bin_cmd!("muni")
        .env("MUNI_HOME", home.path())
        .args(["kb", "show", "cp-002"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Constancia de posesión"));
}

#[test]
fn test_kb_show_unknown_key_fails() {
    let home = tempdir().unwrap();
    write_procedures(home.path());

    cargo_bin_cmd!("muni")
        .env("MUNI_HOME", home.path())
        .args(["kb", "show", "permiso de vuelo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("permiso de vuelo"));
}

#[test]
fn test_ask_answers_from_local_store() {
    let home = tempdir().unwrap();
    write_procedures(home.path());

    cargo_bin_cmd!("muni")
        .env("MUNI_HOME", home.path())
        .args(["ask", "Licencia de funcionamiento"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "<strong>Procedimiento:</strong> Licencia de funcionamiento",
        ));
}

#[test]
fn test_ask_off_topic_gets_canned_reply() {
    let home = tempdir().unwrap();
    write_procedures(home.path());

    cargo_bin_cmd!("muni")
        .env("MUNI_HOME", home.path())
        .args(["ask", "receta de ceviche"])
        .assert()
        .success()
        .stdout(predicate::str::contains("trámite específico"));
}

#[test]
fn test_piped_stdin_runs_one_shot() {
    let home = tempdir().unwrap();
    write_procedures(home.path());

    cargo_bin_cmd!("muni")
        .env("MUNI_HOME", home.path())
        .write_stdin("Constancia de posesión\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "<strong>Procedimiento:</strong> Constancia de posesión",
        ));
}

#[test]
fn test_kb_dir_flag_overrides_default() {
    let home = tempdir().unwrap();
    let other = tempdir().unwrap();
    fs::write(other.path().join("tramite.txt"), LICENCIA).unwrap();

    cargo_bin_cmd!("muni")
        .env("MUNI_HOME", home.path())
        .args(["--kb-dir", other.path().to_str().unwrap(), "kb", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Licencia de funcionamiento"));
}
