use regex::Regex;

use crate::error::{DirectorError, Rejection, Result, Verdict};
use crate::extract::Extract;

/// `REPLACE(pattern)(replacement)`: every line whose start matches the
/// pattern becomes the replacement. The line's terminator is kept.
#[derive(Debug, Default)]
pub struct Replace {
    matcher: Option<Regex>,
}

impl Replace {
    pub fn validate(&mut self, extract: &Extract) -> Verdict {
        let [pattern, _replacement] = extract.params.as_slice() else {
            return Err(Rejection::new(format!(
                "takes exactly two parameters, got {}",
                extract.params.len()
            )));
        };
        if pattern.is_blank() {
            return Err(Rejection::new("pattern must not be blank"));
        }
        let matcher = Regex::new(&pattern.joined())
            .map_err(|e| Rejection::new(format!("invalid pattern: {}", e)))?;
        self.matcher = Some(matcher);
        Ok(())
    }

    pub fn run(&mut self, buffer: &mut [String], extract: &Extract) -> Result<()> {
        let Some(matcher) = &self.matcher else {
            return Err(DirectorError::precondition("REPLACE ran before validation"));
        };
        let replacement = extract
            .params
            .get(1)
            .map(|p| p.joined().into_owned())
            .unwrap_or_default();
        find_and_replace(buffer, matcher, &replacement);
        Ok(())
    }
}

/// Replace every line matched at its start. Returns how many lines changed.
pub fn find_and_replace(lines: &mut [String], matcher: &Regex, replacement: &str) -> usize {
    let mut replaced = 0;
    for line in lines.iter_mut() {
        let (content, terminator) = split_terminator(line);
        if !matcher.find(content).is_some_and(|m| m.start() == 0) {
            continue;
        }
        *line = format!("{}{}", replacement, terminator);
        replaced += 1;
    }
    replaced
}

fn split_terminator(line: &str) -> (&str, &str) {
    let end = if line.ends_with("\r\n") {
        line.len() - 2
    } else if line.ends_with('\n') {
        line.len() - 1
    } else {
        line.len()
    };
    line.split_at(end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn replaces_only_matching_line() {
        let mut buffer = lines(&["alpha\n", "beta\n", "gamma\n"]);
        let matcher = Regex::new("be").unwrap();
        assert_eq!(find_and_replace(&mut buffer, &matcher, "BETA"), 1);
        assert_eq!(buffer, lines(&["alpha\n", "BETA\n", "gamma\n"]));
    }

    #[test]
    fn match_is_anchored_at_line_start() {
        let mut buffer = lines(&["abc\n", "xabc\n"]);
        let matcher = Regex::new("abc").unwrap();
        find_and_replace(&mut buffer, &matcher, "z");
        assert_eq!(buffer, lines(&["z\n", "xabc\n"]));
    }

    #[test]
    fn last_line_without_terminator_stays_without() {
        let mut buffer = lines(&["a\n", "b"]);
        let matcher = Regex::new("b").unwrap();
        find_and_replace(&mut buffer, &matcher, "c");
        assert_eq!(buffer, lines(&["a\n", "c"]));
    }

    #[test]
    fn end_anchor_ignores_terminator() {
        let mut buffer = lines(&["key = 1\r\n"]);
        let matcher = Regex::new("^key = 1$").unwrap();
        find_and_replace(&mut buffer, &matcher, "key = 2");
        assert_eq!(buffer, lines(&["key = 2\r\n"]));
    }
}
