use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

use rnaseq_utils::genome::{GenomeStats, GenomeStatsSource, NativeGenomeStats, ShellGenomeStats};
use rnaseq_utils::io::{TransferMode, DEFAULT_EXCLUDE};
use rnaseq_utils::matcher::ReadTags;
use rnaseq_utils::processing::{rename_and_move, RenameOptions};

fn genome_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/genome.fa")
}

/// raw/<sample>/<library>_{1,2}.fq plus files that must be left alone
fn sequencing_run(root: &Path) {
    for (sample, library) in [("Alpha_S1", "LibA"), ("Beta_S2", "LibB"), ("Other", "LibC")] {
        let dir = root.join(sample);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{}_1.fq", library)), b"@r1\nACGT\n+\nIIII\n").unwrap();
        fs::write(dir.join(format!("{}_2.fq", library)), b"@r2\nTGCA\n+\nIIII\n").unwrap();
        fs::write(dir.join(format!("{}_1.trimmed_filtered.fq", library)), b"").unwrap();
        fs::write(dir.join(format!("{}.md5", library)), b"").unwrap();
    }
}

#[test]
fn test_rename_and_move_integration() {
    let tmp = tempdir().expect("create temp dir");
    let raw = tmp.path().join("raw");
    let out = tmp.path().join("fastq");
    sequencing_run(&raw);

    let opts = RenameOptions {
        input_dir: raw.clone(),
        output_dir: out.clone(),
        tags: ReadTags::new("_1", "_2"),
        extension: "fq".to_string(),
        exclude: DEFAULT_EXCLUDE.to_string(),
        dir_filters: vec!["Alpha".to_string(), "Beta".to_string()],
        mode: TransferMode::Move,
        dry_run: false,
    };
    let (plan, summary) = rename_and_move(&opts).expect("rename failed");

    assert_eq!(summary.directories, 2);
    assert_eq!(summary.transferred, 4);
    assert_eq!(plan.len(), 4);

    assert_eq!(fs::read(out.join("Alpha_S1_R1.fastq")).unwrap(), b"@r1\nACGT\n+\nIIII\n");
    assert_eq!(fs::read(out.join("Beta_S2_R2.fastq")).unwrap(), b"@r2\nTGCA\n+\nIIII\n");
    assert!(!out.join("Other_R1.fastq").exists());
    assert!(raw.join("Other/LibC_1.fq").exists());
    assert!(raw.join("Alpha_S1/LibA_1.trimmed_filtered.fq").exists());

    // a second run finds nothing left to rename
    let (plan, _) = rename_and_move(&opts).expect("rerun failed");
    assert!(plan.is_empty());
}

#[test]
fn test_genome_stats_backends_agree() {
    let native = NativeGenomeStats.genome_stats(&genome_path()).expect("native stats");
    let shell = ShellGenomeStats.genome_stats(&genome_path()).expect("shell stats");
    assert_eq!(
        native,
        GenomeStats {
            sequence_length: 46,
            reference_count: 3
        }
    );
    assert_eq!(shell, native);
}

#[test]
fn test_cli_rename_prints_plan() -> Result<(), Box<dyn std::error::Error>> {
    use assert_cmd::assert::OutputAssertExt;
    use assert_cmd::cargo;
    use predicates::prelude::*;
    use std::process::Command;

    let tmp = tempdir()?;
    let raw = tmp.path().join("raw");
    let out = tmp.path().join("fastq");
    sequencing_run(&raw);

    let mut cmd = Command::new(cargo::cargo_bin!(env!("CARGO_PKG_NAME")));
    cmd.arg("rename")
        .arg("-i")
        .arg(&raw)
        .arg("-1")
        .arg("_1")
        .arg("-2")
        .arg("_2")
        .arg("-e")
        .arg("fq")
        .arg("-d")
        .arg(&out)
        .arg("--copy");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Other_R2.fastq"))
        .stdout(predicate::str::contains("LibA_1.fq\t"));

    // copies, so the sources stay put
    assert!(out.join("Other_R1.fastq").exists());
    assert!(raw.join("Other/LibC_1.fq").exists());

    Ok(())
}

#[test]
fn test_cli_samples() -> Result<(), Box<dyn std::error::Error>> {
    use assert_cmd::assert::OutputAssertExt;
    use assert_cmd::cargo;
    use predicates::prelude::*;
    use std::process::Command;

    let tmp = tempdir()?;
    for name in ["SampleA_rep1.fastq", "SampleB_rep2.fastq"] {
        fs::write(tmp.path().join(name), b"")?;
    }

    let mut cmd = Command::new(cargo::cargo_bin!(env!("CARGO_PKG_NAME")));
    cmd.arg("samples")
        .arg("-i")
        .arg(tmp.path())
        .arg("-s")
        .arg(r"_rep\d+")
        .arg("-r")
        .arg("rep1");
    let output = cmd.output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert_eq!(stdout.lines().count(), 1);
    assert!(stdout.starts_with("SampleA\t"));
    assert!(stdout.trim_end().ends_with("SampleA_rep1.fastq"));

    let mut bad = Command::new(cargo::cargo_bin!(env!("CARGO_PKG_NAME")));
    bad.arg("samples").arg("-i").arg(tmp.path()).arg("-s").arg("(");
    bad.assert()
        .failure()
        .stderr(predicate::str::contains("invalid pattern"));

    Ok(())
}

#[test]
fn test_cli_star_commands() -> Result<(), Box<dyn std::error::Error>> {
    use assert_cmd::assert::OutputAssertExt;
    use assert_cmd::cargo;
    use predicates::prelude::*;
    use std::process::Command;

    let tmp = tempdir()?;
    let config = tmp.path().join("config.yaml");
    fs::write(
        &config,
        format!(
            "params:\n  star_genome: \"--runThreadN 2\"\n\
             flags:\n  star_est_ChrBinsNbits: true\n\
             files:\n  genome_fasta: \"{}\"\n\
             dataset:\n  read_length: 2\n",
            genome_path().display()
        ),
    )?;

    // 46 bases over 3 sequences: log2(15.3) -> 3 beats log2(2) -> 1
    let mut params = Command::new(cargo::cargo_bin!(env!("CARGO_PKG_NAME")));
    params.arg("star-params").arg("-c").arg(&config);
    params
        .assert()
        .success()
        .stdout(predicate::str::contains("--runThreadN 2 --genomeChrBinNbits 3"));

    let mut nbits = Command::new(cargo::cargo_bin!(env!("CARGO_PKG_NAME")));
    nbits
        .arg("star-nbits")
        .arg("-g")
        .arg(genome_path())
        .arg("-l")
        .arg("100")
        .arg("--native");
    let output = nbits.output()?;
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout)?, "6\n");

    let mut files = Command::new(cargo::cargo_bin!(env!("CARGO_PKG_NAME")));
    files.arg("star-files").arg("-d").arg("/idx");
    let output = files.output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert_eq!(stdout.lines().count(), 15);
    assert!(stdout.lines().any(|l| l == "/idx/SAindex"));

    Ok(())
}
