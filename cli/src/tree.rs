use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

/// Render `root` as an indented tree: `+` marks a directory, `-` a file,
/// two spaces per level. Entries are sorted by name.
pub fn render(root: &Path) -> io::Result<String> {
    if !root.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} is not a directory", root.display()),
        ));
    }
    let mut out = String::new();
    let _ = writeln!(out, "+ {}", root.display());
    render_children(root, 2, &mut out)?;
    Ok(out)
}

fn render_children(dir: &Path, indent: usize, out: &mut String) -> io::Result<()> {
    let mut entries = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        let is_dir = entry.file_type()?.is_dir();
        let marker = if is_dir { '+' } else { '-' };
        let _ = writeln!(
            out,
            "{}{} {}",
            " ".repeat(indent),
            marker,
            entry.file_name().to_string_lossy()
        );
        if is_dir {
            render_children(&path, indent + 2, out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn nested_tree() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("conf/sub")).unwrap();
        fs::write(tmp.path().join("conf/app.toml"), "").unwrap();
        fs::write(tmp.path().join("conf/sub/x"), "").unwrap();
        fs::write(tmp.path().join("readme"), "").unwrap();

        let tree = render(tmp.path()).unwrap();
        let lines: Vec<&str> = tree.lines().skip(1).collect();
        assert_eq!(
            lines,
            vec!["  + conf", "    - app.toml", "    + sub", "      - x", "  - readme"]
        );
    }

    #[test]
    fn missing_directory() {
        let tmp = TempDir::new().unwrap();
        assert!(render(&tmp.path().join("nope")).is_err());
    }
}
