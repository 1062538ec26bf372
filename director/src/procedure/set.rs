use crate::error::{Rejection, Result, Verdict};
use crate::extract::Extract;

/// `SET{...}`: replace the whole buffer with the parameter.
#[derive(Debug, Default)]
pub struct Set;

impl Set {
    pub fn validate(&mut self, extract: &Extract) -> Verdict {
        if extract.params.len() != 1 {
            return Err(Rejection::new(format!(
                "takes exactly one parameter, got {}",
                extract.params.len()
            )));
        }
        Ok(())
    }

    pub fn run(&mut self, buffer: &mut Vec<String>, extract: &Extract) -> Result<()> {
        let content = extract
            .params
            .first()
            .map(|p| p.joined().into_owned())
            .unwrap_or_default();
        buffer.clear();
        buffer.push(content);
        Ok(())
    }
}
