use assert_cmd::prelude::*;
use once_cell::sync::Lazy;
use predicates::str::contains;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

static MODEL_OBJ: Lazy<String> = Lazy::new(|| {
    "\
v 0 0 0
v 1 0 0
v 0 1 0
v 1 1 0
usemtl body
f 1 2 3
usemtl visor
f 2 4 3
"
    .to_string()
});

const MANIFEST_XML: &str = r#"<materials default="diffuse">
  <material>
    <submesh>visor</submesh>
    <mode>reflective</mode>
  </material>
</materials>
"#;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().expect("temp file");
    tmp.write_all(contents.as_bytes()).expect("write temp file");
    tmp
}

#[test]
fn cli_prints_model_and_material_summary() {
    let model = write_temp(&MODEL_OBJ);
    let manifest = write_temp(MANIFEST_XML);

    let mut cmd = Command::cargo_bin("capsule-viewer").expect("binary exists");
    cmd.arg(model.path())
        .arg("--materials")
        .arg(manifest.path())
        .arg("--summary-only");
    cmd.assert()
        .success()
        .stdout(contains("Loaded model with 4 vertices (2 submeshes)"))
        .stdout(contains(" - body (diffuse)"))
        .stdout(contains(" - visor (reflective)"))
        .stdout(contains(" - 4 vertices, 6 indices, 2 triangles"));
}

#[test]
fn cli_falls_back_to_builtin_model() {
    let mut cmd = Command::cargo_bin("capsule-viewer").expect("binary exists");
    cmd.arg("--summary-only");
    cmd.assert()
        .success()
        .stdout(contains("(2 submeshes)"))
        .stdout(contains(" - body (textured)"))
        .stdout(contains(" - trim (reflective)"));
}

#[test]
fn cli_rejects_unknown_flags() {
    let mut cmd = Command::cargo_bin("capsule-viewer").expect("binary exists");
    cmd.arg("--frobnicate");
    cmd.assert().failure().stderr(contains("Unknown argument"));
}
