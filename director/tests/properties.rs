use proptest::prelude::*;

use director::{Director, Options};
use tempfile::TempDir;

/// One statement over a small pool of file names.
fn statement() -> impl Strategy<Value = String> {
    let name = prop_oneof![Just("a.txt"), Just("b.txt"), Just("dir/c.txt")];
    (0..4usize, name).prop_map(|(kind, name)| match kind {
        0 => format!("CREATE '{}'", name),
        1 => format!("EDIT '{}' APPEND(line)", name),
        2 => format!("READ '{}'", name),
        _ => format!("REMOVE '{}'", name),
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Validating twice gives the same verdict and never touches the disk.
    #[test]
    fn validation_is_idempotent(statements in prop::collection::vec(statement(), 1..6)) {
        let tmp = TempDir::new().unwrap();
        let source = statements.join("\n");
        let mut director = Director::new(Options {
            base_dir: tmp.path().to_path_buf(),
            ..Options::default()
        });
        director.loads(&source, 0).unwrap();

        let first = director.validate().map_err(|e| e.to_string());
        let second = director.validate().map_err(|e| e.to_string());
        prop_assert_eq!(first, second);
        prop_assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }
}
