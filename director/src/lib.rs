pub mod cursor;
pub mod directive;
pub mod engine;
pub mod error;
pub mod extract;
pub mod procedure;
pub mod registry;
pub mod staging;

pub use engine::{CacheEntry, DEFAULT_SANDBOX_DIR, Director, Options, State};
pub use error::{DirectorError, Rejection, Result, Verdict};
pub use extract::Extract;
pub use registry::Registry;
pub use staging::StagingFs;
