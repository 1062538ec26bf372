use crate::error::{DirectorError, Rejection, Result, Verdict};
use crate::extract::Extract;
use crate::staging::StagingFs;

const MAX_MODE: u32 = 0o7777;

/// `CHMOD(755)`: set the permission bits of every selected file.
#[derive(Debug, Default)]
pub struct ChMod {
    mode: Option<u32>,
}

impl ChMod {
    pub fn validate(&mut self, extract: &Extract) -> Verdict {
        let [param] = extract.params.as_slice() else {
            return Err(Rejection::new(format!(
                "takes exactly one mode, got {}",
                extract.params.len()
            )));
        };
        let digits = param.joined();
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(Rejection::new(format!("mode '{}' is not numeric", digits)));
        }
        let mode = u32::from_str_radix(&digits, 8)
            .ok()
            .filter(|m| *m <= MAX_MODE)
            .ok_or_else(|| Rejection::new(format!("mode '{}' is not a valid octal mode", digits)))?;
        self.mode = Some(mode);
        Ok(())
    }

    pub fn run(&mut self, fs: &mut StagingFs, path: &str) -> Result<()> {
        let Some(mode) = self.mode else {
            return Err(DirectorError::precondition("CHMOD ran before validation"));
        };
        fs.chmod(path, mode)
    }

    pub fn mode(&self) -> Option<u32> {
        self.mode
    }
}
