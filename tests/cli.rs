use assert_cmd::cargo::cargo_bin_cmd;
use flate2::Compression;
use flate2::write::GzEncoder;
use predicates::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const WALRUS_TREE: &str = "(ROOT (S (NP (PRP I)) (VP (VBP am) (NP (DT the) (NN walrus))) (. .)))";

const WALRUS_CONLLU: &str = "# sent_id = 1
# text = I am the walrus.
# constituency = (ROOT (S (NP (PRP I)) (VP (VBP am) (NP (DT the) (NN walrus))) (. .)))
1\tI\tI\tPRON\tPRP\t_\t4\tnsubj\t_\t_
2\tam\tbe\tAUX\tVBP\t_\t4\tcop\t_\t_
3\tthe\tthe\tDET\tDT\t_\t4\tdet\t_\t_
4\twalrus\twalrus\tNOUN\tNN\t_\t0\troot\t_\tSpaceAfter=No
5\t.\t.\tPUNCT\t.\t_\t4\tpunct\t_\t_

";

const WALRUS_DEPS: &str = "# I am the walrus.
nsubj 'walrus' →  'I'
cop   'walrus' →  'am'
det   'walrus' →  'the'
root  'ROOT'   →  'walrus'
punct 'walrus' →  '.'

";

fn fixture(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn gzip_fixture(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut encoder = GzEncoder::new(std::fs::File::create(&path).unwrap(), Compression::default());
    encoder.write_all(contents.as_bytes()).unwrap();
    encoder.finish().unwrap();
    path
}

fn parsetree(args: &[&str], path: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("parsetree");
    cmd.env_remove("RUST_LOG").args(args).arg(path);
    cmd
}

#[test]
fn tree_from_conllu() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir, "walrus.conllu", WALRUS_CONLLU);

    parsetree(&["tree"], &path)
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{}\n", WALRUS_TREE)));
}

#[test]
fn tree_from_gzipped_conllu() {
    let dir = tempfile::tempdir().unwrap();
    let path = gzip_fixture(&dir, "walrus.conllu.gz", WALRUS_CONLLU);

    parsetree(&["tree"], &path)
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{}\n", WALRUS_TREE)));
}

#[test]
fn tree_from_bracket_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(
        &dir,
        "trees.txt",
        &format!("{}\n\n(ROOT (NP (DT the)\n  (NN eggman)))\n", WALRUS_TREE),
    );

    parsetree(&["tree"], &path)
        .assert()
        .success()
        .stdout(predicate::str::diff(format!(
            "{}\n(ROOT (NP (DT the) (NN eggman)))\n",
            WALRUS_TREE
        )));
}

#[test]
fn tree_indented() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir, "walrus.conllu", WALRUS_CONLLU);

    parsetree(&["tree", "--indent"], &path)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("(ROOT\n  (S\n    (NP (PRP I))\n"));
}

#[test]
fn deps_from_conllu() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir, "walrus.conll", WALRUS_CONLLU);

    parsetree(&["deps"], &path)
        .assert()
        .success()
        .stdout(predicate::str::diff(WALRUS_DEPS));
}

#[test]
fn phrases_from_bracket_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir, "walrus.mrg", WALRUS_TREE);

    // Words are read off the preterminals, so the period stands apart
    parsetree(&["phrases"], &path)
        .assert()
        .success()
        .stdout(predicate::str::diff(
            "# I am the walrus .\nNP: the walrus\nS: I am the walrus .\nVP: am the walrus\n\n",
        ));
}

#[test]
fn phrases_min_words() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir, "walrus.conllu", WALRUS_CONLLU);

    parsetree(&["phrases", "--min-words", "5"], &path)
        .assert()
        .success()
        .stdout(predicate::str::diff("# I am the walrus.\nS: I am the walrus .\n\n"));
}

#[test]
fn processors_restrict_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir, "walrus.conllu", WALRUS_CONLLU);

    // No constituency stage: nothing to print
    parsetree(&["--processors", "tokenize,mwt,pos,lemma,depparse", "tree"], &path)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    // Dependencies survive without it
    parsetree(&["-p", "tokenize,mwt,pos,lemma,depparse", "deps"], &path)
        .assert()
        .success()
        .stdout(predicate::str::diff(WALRUS_DEPS));

    parsetree(&["-p", "tokenize,pos,constituency", "deps"], &path)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn bad_sentence_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(
        &dir,
        "mixed.conllu",
        &format!("# text = broken\n1\tbroken\t_\n\n{}", WALRUS_CONLLU),
    );

    parsetree(&["deps"], &path)
        .assert()
        .success()
        .stdout(predicate::str::diff(WALRUS_DEPS))
        .stderr(predicate::str::contains("skipping sentence"));
}

#[test]
fn unknown_processor_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir, "walrus.conllu", WALRUS_CONLLU);

    parsetree(&["--processors", "tokenize,sentiment", "tree"], &path)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(
            predicate::str::contains("invalid --processors")
                .and(predicate::str::contains("sentiment")),
        );
}

#[test]
fn missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.conllu");

    parsetree(&["tree"], &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to open"));
}

#[test]
fn bad_bracket_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir, "broken.txt", "(ROOT (NP (DT the)");

    parsetree(&["tree"], &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse trees"));
}

#[test]
fn parse_with_model_dir() {
    let dir = tempfile::tempdir().unwrap();
    fixture(&dir, "en.conllu", WALRUS_CONLLU);

    let mut cmd = cargo_bin_cmd!("parsetree");
    cmd.env_remove("RUST_LOG")
        .env_remove("PARSETREE_MODELS")
        .args(["parse", "I am the walrus.", "--model-dir"])
        .arg(dir.path());

    let expected = format!("{}\n{}", WALRUS_TREE, WALRUS_DEPS);
    cmd.assert().success().stdout(predicate::str::diff(expected));
}

#[test]
fn parse_unknown_model_fails() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = cargo_bin_cmd!("parsetree");
    cmd.env_remove("RUST_LOG")
        .args(["parse", "I am the walrus.", "--model", "fr", "--model-dir"])
        .arg(dir.path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("failed to load model 'fr'"));
}
