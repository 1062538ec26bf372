use crate::directive::{Read, require_usable};
use crate::error::{Rejection, Verdict};
use crate::extract::Extract;
use crate::staging::StagingFs;

/// `COPYTO(dest)...`: copy the file being read to each destination.
/// The copy is handed to the READ directive, which writes it at teardown.
#[derive(Debug, Default)]
pub struct CopyTo;

impl CopyTo {
    pub fn validate(&mut self, fs: &mut StagingFs, extract: &Extract) -> Verdict {
        for destination in extract.paths() {
            if destination.is_empty() {
                return Err(Rejection::new("destination must not be blank"));
            }
            require_usable(fs, &destination)?;
        }
        for destination in extract.paths() {
            fs.track(&destination);
        }
        Ok(())
    }

    pub fn run(&mut self, read: &mut Read, extract: &Extract) {
        for destination in extract.paths() {
            read.copy_to(destination.into_owned());
        }
    }
}
