use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn demos_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("demos")
}

fn demo_directories() -> Vec<PathBuf> {
    let mut directories = fs::read_dir(demos_root())
        .expect("demos root must exist")
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect::<Vec<_>>();
    directories.sort();
    assert!(!directories.is_empty(), "expected demo scripts");
    directories
}

/// Error code the demo's test case expects, if any.
fn expected_error(directory: &Path) -> Option<String> {
    let raw = fs::read_to_string(directory.join("testcase.json")).ok()?;
    let case: serde_json::Value = serde_json::from_str(&raw).ok()?;
    case.get("expectedError")?.as_str().map(str::to_string)
}

fn cli(args: &[&str], directory: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sb-cli"))
        .args(args)
        .arg(directory)
        .output()
        .expect("cli should execute")
}

#[test]
fn every_demo_runs_and_transpiles() {
    for directory in demo_directories() {
        let expected_error = expected_error(&directory);
        for args in [&["run", "--ticks", "30"][..], &["transpile"][..], &["compile"][..]] {
            let output = cli(args, &directory);
            let stdout = String::from_utf8_lossy(&output.stdout);
            match &expected_error {
                Some(code) => {
                    assert!(!output.status.success(), "{} should fail", directory.display());
                    assert!(stdout.contains("RESULT:ERROR"));
                    assert!(
                        stdout.contains(&format!("ERROR_CODE:{}", code)),
                        "stdout for {} was:\n{}",
                        directory.display(),
                        stdout
                    );
                    assert!(stdout.contains("ERROR_AT:"));
                }
                None => {
                    if !output.status.success() {
                        panic!(
                            "{:?} on {} failed\nstdout:\n{}\nstderr:\n{}",
                            args,
                            directory.display(),
                            stdout,
                            String::from_utf8_lossy(&output.stderr)
                        );
                    }
                    assert!(stdout.starts_with("RESULT:OK"), "{}", directory.display());
                }
            }
        }
    }
}

#[test]
fn tokens_end_with_end_of_file() {
    let directory = demo_directories()
        .into_iter()
        .find(|directory| expected_error(directory).is_none())
        .expect("a valid demo");
    let output = cli(&["tokens"], &directory);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let last = stdout.lines().last().expect("token lines");
    assert!(last.starts_with("TOKEN:endOfFile|"), "{}", last);
}
