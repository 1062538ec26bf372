use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tempfile::TempDir;

use director::{Director, DirectorError, Options};

const TEST_SUFFIX: &str = ".test.fsdir";

#[derive(Debug, Default, Deserialize)]
pub struct TestConfig {
    /// Human-readable test description.
    #[serde(default)]
    pub description: Option<String>,

    /// Real files seeded into the working directory before the script loads,
    /// keyed by relative path.
    #[serde(default)]
    pub files: BTreeMap<String, String>,

    /// If true, the test expects parsing to fail.
    #[serde(default)]
    pub expect_parse_error: bool,

    /// The first error's Display string must contain this substring.
    #[serde(default)]
    pub expect_error: Option<String>,

    /// Exact sandbox contents after the run, keyed by relative path.
    #[serde(default)]
    pub expect_files: BTreeMap<String, String>,

    /// Paths that must not exist in the sandbox after the run.
    #[serde(default)]
    pub expect_missing: Vec<String>,
}

/// Split a `.test.fsdir` file into its TOML config and script source.
fn parse_test_file(content: &str) -> Result<(TestConfig, &str), String> {
    let content = content.trim_start_matches('\u{feff}');

    let Some(after_open) = content.strip_prefix("---") else {
        return Err("missing opening --- frontmatter delimiter".into());
    };
    let after_open = after_open
        .strip_prefix('\n')
        .or_else(|| after_open.strip_prefix("\r\n"))
        .unwrap_or(after_open);

    let close_pos = after_open
        .find("\n---")
        .ok_or("missing closing --- frontmatter delimiter")?;

    let toml_str = after_open[..close_pos].trim_end_matches('\r');
    let rest = &after_open[close_pos + 4..];
    let source = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);

    let config: TestConfig =
        toml::from_str(toml_str).map_err(|e| format!("TOML parse error: {}", e))?;

    Ok((config, source))
}

pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: TestOutcome,
}

impl TestResult {
    fn label(&self) -> &str {
        self.description.as_deref().unwrap_or_else(|| {
            self.path
                .file_name()
                .and_then(|s| s.to_str())
                .and_then(|s| s.strip_suffix(TEST_SUFFIX))
                .unwrap_or("?")
        })
    }
}

fn run_single_test(path: &Path) -> TestResult {
    let mut description = None;
    let outcome = match evaluate(path, &mut description) {
        Ok(()) => TestOutcome::Pass,
        Err(reason) => TestOutcome::Fail(reason),
    };
    TestResult {
        path: path.to_path_buf(),
        description,
        outcome,
    }
}

/// Run one test file in a fresh temporary directory. `Err` carries the
/// failure reason.
fn evaluate(path: &Path, description: &mut Option<String>) -> Result<(), String> {
    let content = fs::read_to_string(path).map_err(|e| format!("cannot read file: {}", e))?;
    let (config, source) =
        parse_test_file(&content).map_err(|e| format!("frontmatter error: {}", e))?;
    description.clone_from(&config.description);

    let workdir = TempDir::new().map_err(|e| format!("cannot create temp dir: {}", e))?;
    seed_files(workdir.path(), &config.files)?;

    let mut director = Director::new(Options {
        base_dir: workdir.path().to_path_buf(),
        ..Options::default()
    });

    let loaded = director.loads(source, 0);
    if config.expect_parse_error {
        return match loaded {
            Err(DirectorError::Parse(_)) => Ok(()),
            Err(other) => Err(format!("expected parse error, got: {}", other)),
            Ok(()) => Err("expected parse error, but parsing succeeded".into()),
        };
    }

    let result = loaded
        .and_then(|()| director.validate())
        .and_then(|()| director.sandbox_run());

    match (&config.expect_error, result) {
        (Some(expected), Err(err)) => {
            let err_str = err.to_string();
            if err_str.contains(expected.as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "expected error containing \"{}\", got: {}",
                    expected, err_str
                ))
            }
        }
        (Some(expected), Ok(())) => Err(format!(
            "expected error containing \"{}\", but the run succeeded",
            expected
        )),
        (None, Err(err)) => Err(format!("unexpected error: {}", err)),
        (None, Ok(())) => check_sandbox(director.sandbox_root(), &config),
    }
}

fn seed_files(root: &Path, files: &BTreeMap<String, String>) -> Result<(), String> {
    for (name, content) in files {
        let path = root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("cannot seed '{}': {}", name, e))?;
        }
        fs::write(&path, content).map_err(|e| format!("cannot seed '{}': {}", name, e))?;
    }
    Ok(())
}

/// Compare the sandbox against `expect_files` and `expect_missing`.
fn check_sandbox(sandbox: &Path, config: &TestConfig) -> Result<(), String> {
    for (name, expected) in &config.expect_files {
        let actual = fs::read_to_string(sandbox.join(name))
            .map_err(|e| format!("expected sandbox file '{}': {}", name, e))?;
        if &actual != expected {
            return Err(format!(
                "content mismatch in '{}'\n  expected: {:?}\n  actual:   {:?}",
                name, expected, actual
            ));
        }
    }
    for name in &config.expect_missing {
        if sandbox.join(name).exists() {
            return Err(format!("'{}' should not exist in the sandbox", name));
        }
    }
    Ok(())
}

/// Discover test files grouped by category (subfolder relative to root).
/// Files directly in `root` get category "" (uncategorized).
fn discover_categorized(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect_tests(root, root, &mut categories);
    for files in categories.values_mut() {
        files.sort();
    }
    categories
}

fn collect_tests(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_tests(&path, root, out);
        } else if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(TEST_SUFFIX))
        {
            let category = path
                .parent()
                .and_then(|p| p.strip_prefix(root).ok())
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            out.entry(category).or_default().push(path);
        }
    }
}

/// List available categories for the given test path.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }

    let categories = discover_categorized(path);
    if categories.is_empty() {
        eprintln!("no {} files found in {}", TEST_SUFFIX, path.display());
        return;
    }

    eprintln!("available categories:");
    for (cat, files) in &categories {
        let label = if cat.is_empty() { "(root)" } else { cat.as_str() };
        eprintln!("  {} ({} tests)", label, files.len());
    }
}

fn paint(s: &str, code: &str, no_color: bool) -> String {
    if no_color {
        s.to_string()
    } else {
        format!("\x1b[{}m{}\x1b[0m", code, s)
    }
}

fn select_categories<'a>(
    all: &'a BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> BTreeMap<&'a str, &'a Vec<PathBuf>> {
    if requested.is_empty() {
        return all.iter().map(|(k, v)| (k.as_str(), v)).collect();
    }

    let mut filtered = BTreeMap::new();
    for requested in requested {
        let req = requested.trim_matches('/');
        let prefix = format!("{}/", req);
        let mut found = false;
        for (cat, files) in all {
            if cat == req || cat.starts_with(&prefix) {
                filtered.insert(cat.as_str(), files);
                found = true;
            }
        }
        if !found {
            eprintln!(
                "warning: category '{}' not found (available: {})",
                req,
                all.keys()
                    .map(|k| if k.is_empty() { "(root)" } else { k.as_str() })
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }
    filtered
}

/// Run every test file under `path` (or a single file).
/// If `categories` is non-empty, only run tests in those categories.
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let single = path.is_file();
    let all_categories = if single {
        BTreeMap::from([(String::new(), vec![path.to_path_buf()])])
    } else {
        discover_categorized(path)
    };

    if all_categories.is_empty() {
        eprintln!("no {} files found in {}", TEST_SUFFIX, path.display());
        return 1;
    }

    let run_categories = if single {
        select_categories(&all_categories, &[])
    } else {
        select_categories(&all_categories, categories)
    };
    if run_categories.is_empty() {
        eprintln!("no matching categories found");
        return 1;
    }

    let mut passed = 0usize;
    let mut failures: Vec<TestResult> = Vec::new();

    for (cat, files) in &run_categories {
        if !single {
            let header = if cat.is_empty() { "(root)" } else { *cat };
            eprintln!();
            eprintln!("{}", paint(header, "1", no_color));
        }

        for file in *files {
            let result = run_single_test(file);
            match &result.outcome {
                TestOutcome::Pass => {
                    passed += 1;
                    eprintln!("  {}  {}", paint("PASS", "32", no_color), result.label());
                }
                TestOutcome::Fail(_) => {
                    eprintln!("  {}  {}", paint("FAIL", "31", no_color), result.label());
                    failures.push(result);
                }
            }
        }
    }

    if !failures.is_empty() {
        eprintln!();
        eprintln!("failures:");
        for f in &failures {
            eprintln!();
            eprintln!("  --- {} ---", f.path.display());
            if let TestOutcome::Fail(reason) = &f.outcome {
                for line in reason.lines() {
                    eprintln!("  {}", line);
                }
            }
        }
    }

    eprintln!();
    if failures.is_empty() {
        eprintln!(
            "test result: {}. {} passed, 0 failed",
            paint("ok", "32", no_color),
            passed
        );
        0
    } else {
        let failed = failures.len();
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            paint("FAILED", "31", no_color),
            passed,
            failed,
            passed + failed
        );
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scripts_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/scripts")
    }

    #[test]
    fn frontmatter_is_split_from_source() {
        let (config, source) = parse_test_file(
            "---\ndescription = \"demo\"\nexpect_missing = [\"x\"]\n\n[files]\n\"a.txt\" = \"hi\\n\"\n---\nEDIT 'a.txt' APPEND(x)\n",
        )
        .unwrap();
        assert_eq!(config.description.as_deref(), Some("demo"));
        assert_eq!(config.files.get("a.txt").map(String::as_str), Some("hi\n"));
        assert_eq!(config.expect_missing, vec!["x".to_string()]);
        assert_eq!(source, "EDIT 'a.txt' APPEND(x)\n");
    }

    #[test]
    fn missing_frontmatter_is_an_error() {
        assert!(parse_test_file("CREATE 'a'\n").is_err());
        assert!(parse_test_file("---\ndescription = \"x\"\nCREATE 'a'\n").is_err());
    }

    #[test]
    fn scripts_are_discovered_by_category() {
        let categories = discover_categorized(&scripts_dir());
        assert!(categories.contains_key("directives"));
        assert!(categories.contains_key("procedures"));
        assert!(categories.contains_key("errors"));
    }

    #[test]
    fn bundled_scripts_pass() {
        let categories = discover_categorized(&scripts_dir());
        let mut failures = Vec::new();
        for file in categories.values().flatten() {
            if let TestOutcome::Fail(reason) = run_single_test(file).outcome {
                failures.push(format!("{}: {}", file.display(), reason));
            }
        }
        assert!(failures.is_empty(), "failing scripts:\n{}", failures.join("\n"));
    }

    #[test]
    fn wrong_expectation_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wrong.test.fsdir");
        fs::write(
            &path,
            "---\n[expect_files]\n\"a.txt\" = \"nope\"\n---\nCREATE 'a.txt'\n",
        )
        .unwrap();
        assert!(matches!(run_single_test(&path).outcome, TestOutcome::Fail(_)));
        assert_eq!(run_tests(&path, true, &[]), 1);
    }
}
