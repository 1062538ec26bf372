use crate::error::Result;
use crate::extract::Extract;

/// `APPEND(line)...`: add each parameter to the end of the buffer as a new
/// line. A multi-line parameter is added as one block.
#[derive(Debug, Default)]
pub struct Append;

impl Append {
    pub fn run(&mut self, buffer: &mut Vec<String>, extract: &Extract) -> Result<()> {
        terminate_last_line(buffer);
        for param in &extract.params {
            buffer.push(format!("{}\n", param.joined()));
        }
        Ok(())
    }
}

/// Give an unterminated last line its newline so appended text starts on a
/// line of its own. An empty last line is dropped instead.
fn terminate_last_line(buffer: &mut Vec<String>) {
    if buffer.last().is_some_and(String::is_empty) {
        buffer.pop();
    } else if let Some(last) = buffer.last_mut() {
        if !last.ends_with('\n') {
            last.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unterminated_last_line_gets_newline() {
        let mut buffer = vec!["abc".to_string()];
        terminate_last_line(&mut buffer);
        assert_eq!(buffer, vec!["abc\n"]);
    }

    #[test]
    fn terminated_and_empty_buffers() {
        let mut buffer = vec!["a\n".to_string()];
        terminate_last_line(&mut buffer);
        assert_eq!(buffer, vec!["a\n"]);

        let mut buffer = vec![String::new()];
        terminate_last_line(&mut buffer);
        assert!(buffer.is_empty());

        let mut buffer: Vec<String> = Vec::new();
        terminate_last_line(&mut buffer);
        assert!(buffer.is_empty());
    }
}
