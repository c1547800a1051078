//! Command-line tests: run the binary against small files in a temp dir.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const METADATA: &str = "\
reference_id\tgene_length\tcategory\tmechanism\tgene_name
ref1\t300\tbetalactam\tantibiotic inactivation\tTEM-1
ref2\tNA\ttetracycline\tribosomal protection\ttetM
sp|P0A0|FEATURES|CARD|sulfonamide|sul1\t840\t\t\t
";

const GENE_ALIGNMENTS: &str = "\
# query\treference\tidentity\tlength\tmismatch\tgapopen\tqstart\tqend\tsstart\tsend\tevalue\tbitscore
g1\tref1\t90.0\t260\t26\t0\t1\t780\t1\t260\t1e-20\t420
g2\tref1\t88.0\t260\t31\t0\t1\t780\t41\t300\t1e-15\t400
g3\tref2\t95.0\t120\t2\t0\t1\t360\t1\t120\t1e-40\t220
g4\tref1\t30.0\t100\t60\t2\t1\t300\t1\t100\t1e-5\t40
";

fn cmd() -> Command {
    Command::cargo_bin("arg-resolver").unwrap()
}

fn write(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path.to_string_lossy().to_string()
}

#[test]
fn test_help() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("predict"))
        .stdout(predicate::str::contains("database"));
}

#[test]
fn test_predict_genes_mode_writes_tables() {
    let dir = TempDir::new().unwrap();
    let metadata = write(dir.path(), "features.tsv", METADATA);
    let alignments = write(dir.path(), "genes.tsv", GENE_ALIGNMENTS);
    let prefix = dir.path().join("out").join("sample");

    cmd()
        .args(["predict", "--model", "LS", "-i", &alignments, "-d", &metadata, "-o"])
        .arg(&prefix)
        .assert()
        .success()
        .stdout(predicate::str::contains("ARG calls: 2"));

    let table = fs::read_to_string(dir.path().join("out/sample.ARG.tsv")).unwrap();
    let rows: Vec<&str> = table.lines().collect();
    assert_eq!(rows.len(), 3);
    assert!(rows[0].starts_with("reference_id\tgene\tcategory"));
    assert!(rows[1].starts_with("ref1\tTEM-1\tbetalactam\tantibiotic inactivation"));
    assert!(rows[2].starts_with("ref2\ttetM\ttetracycline"));
    assert!(rows[2].contains("\tNA\t"));

    assert!(dir.path().join("out/sample.potential.ARG.tsv").exists());
    assert!(dir.path().join("out/sample.summary.json").exists());
    assert!(!dir.path().join("out/sample.type.counts.tsv").exists());
}

#[test]
fn test_predict_short_reads_with_predictions() {
    let dir = TempDir::new().unwrap();
    let metadata = write(dir.path(), "features.tsv", METADATA);
    let alignments = write(
        dir.path(),
        "reads.tsv",
        "r1\tref1\t99.0\t33\t0\t0\t1\t99\t1\t33\t1e-15\t70\n\
         r2\tref1\t98.0\t33\t0\t0\t1\t99\t40\t72\t1e-15\t68\n\
         r3\tsp|P0A0|FEATURES|CARD|sulfonamide|sul1\t97.0\t33\t0\t0\t1\t99\t1\t33\t1e-15\t66\n",
    );
    let predictions = write(
        dir.path(),
        "predictions.tsv",
        "query_id\tcategory\tprobability\nr1\tbetalactam\t0.99\nr2\tbetalactam\t0.97\nr3\tsulfonamide\t0.91\n",
    );
    let prefix = dir.path().join("sample");

    cmd()
        .args(["predict", "--model", "ss", "-i", &alignments, "-d", &metadata])
        .args(["--predictions", &predictions, "--marker-count", "100", "-o"])
        .arg(&prefix)
        .assert()
        .success();

    let counts = fs::read_to_string(dir.path().join("sample.type.counts.tsv")).unwrap();
    assert_eq!(counts, "category\tread_count\nbetalactam\t2\nsulfonamide\t1\n");

    let subtypes = fs::read_to_string(dir.path().join("sample.subtype.counts.tsv")).unwrap();
    assert!(subtypes.contains("betalactam|TEM-1\t2"));
    assert!(subtypes.contains("sulfonamide|sul1\t1"));

    let abundance = fs::read_to_string(dir.path().join("sample.type.abundance.tsv")).unwrap();
    assert!(abundance.starts_with("category\tabundance\nbetalactam\t2.000000e-2"));
}

#[test]
fn test_predict_json_summary() {
    let dir = TempDir::new().unwrap();
    let metadata = write(dir.path(), "features.tsv", METADATA);
    let alignments = write(dir.path(), "genes.tsv", GENE_ALIGNMENTS);
    let prefix = dir.path().join("sample");

    let output = cmd()
        .args(["--format", "json", "predict", "--model", "LS", "-i", &alignments, "-d", &metadata, "-o"])
        .arg(&prefix)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["summary"]["mode"], "long_sequence");
    assert_eq!(json["summary"]["filter"]["low_identity"], 1);
    assert_eq!(json["summary"]["status"], "completed_with_warnings");
    assert_eq!(json["calls"].as_array().unwrap().len(), 2);
}

#[test]
fn test_config_file_and_flag_override() {
    let dir = TempDir::new().unwrap();
    let metadata = write(dir.path(), "features.tsv", METADATA);
    let alignments = write(dir.path(), "genes.tsv", GENE_ALIGNMENTS);
    let config = write(dir.path(), "config.json", r#"{"mode": "long_sequence", "identity": 99.0}"#);
    let prefix = dir.path().join("sample");

    // Config alone: identity 99 rejects every alignment
    cmd()
        .args(["predict", "--config", &config, "-i", &alignments, "-d", &metadata, "-o"])
        .arg(&prefix)
        .assert()
        .success()
        .stdout(predicate::str::contains("ARG calls: 0"));

    // Flag wins over the file
    cmd()
        .args(["predict", "--config", &config, "--identity", "80", "-i", &alignments, "-d", &metadata, "-o"])
        .arg(&prefix)
        .assert()
        .success()
        .stdout(predicate::str::contains("ARG calls: 2"));
}

#[test]
fn test_predict_help_explains_coverage_arithmetic() {
    cmd()
        .args(["predict", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(length - 1) / length"));
}

#[test]
fn test_short_fragment_fails_overlap() {
    let dir = TempDir::new().unwrap();
    let metadata = write(dir.path(), "features.tsv", METADATA);
    let alignments = write(
        dir.path(),
        "genes.tsv",
        "g1\tref1\t95.0\t30\t1\t0\t1\t90\t1\t30\t1e-20\t60\n",
    );

    cmd()
        .args(["--format", "tsv", "predict", "--model", "LS", "-i", &alignments, "-d", &metadata, "-o"])
        .arg(dir.path().join("sample"))
        .assert()
        .success()
        .stdout(predicate::str::contains("low_overlap\t1"))
        .stdout(predicate::str::contains("arg_calls\t0"));
}

#[test]
fn test_predict_requires_model() {
    let dir = TempDir::new().unwrap();
    let metadata = write(dir.path(), "features.tsv", METADATA);
    let alignments = write(dir.path(), "genes.tsv", GENE_ALIGNMENTS);

    cmd()
        .args(["predict", "-i", &alignments, "-d", &metadata, "-o"])
        .arg(dir.path().join("sample"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No model selected"));
}

#[test]
fn test_predict_rejects_invalid_cutoff() {
    let dir = TempDir::new().unwrap();
    let metadata = write(dir.path(), "features.tsv", METADATA);
    let alignments = write(dir.path(), "genes.tsv", GENE_ALIGNMENTS);

    cmd()
        .args(["predict", "--model", "LS", "--min-prob", "1.5", "-i", &alignments, "-d", &metadata, "-o"])
        .arg(dir.path().join("sample"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("probability cutoff"));
}

#[test]
fn test_predict_fails_on_empty_input() {
    let dir = TempDir::new().unwrap();
    let metadata = write(dir.path(), "features.tsv", METADATA);
    let alignments = write(dir.path(), "empty.tsv", "# nothing here\n");
    let prefix = dir.path().join("sample");

    cmd()
        .args(["predict", "--model", "LS", "-i", &alignments, "-d", &metadata, "-o"])
        .arg(&prefix)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no records"));

    assert!(!dir.path().join("sample.ARG.tsv").exists());
}

#[test]
fn test_database_stats_and_show() {
    let dir = TempDir::new().unwrap();
    let metadata = write(dir.path(), "features.tsv", METADATA);

    cmd()
        .args(["database", "stats", "-d", &metadata, "--format", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("betalactam\t1"))
        .stdout(predicate::str::contains("sulfonamide\t1"));

    cmd()
        .args(["database", "show", "ref2", "-d", &metadata])
        .assert()
        .success()
        .stdout(predicate::str::contains("tetM"))
        .stdout(predicate::str::contains("Length:    NA"));

    cmd()
        .args(["database", "show", "missing", "-d", &metadata])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}
