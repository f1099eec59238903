pub mod config;
pub mod diagnostics;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod record;
pub mod table;

pub use config::NormalizerConfig;
pub use error::NormalizeError;
pub use loader::WorkbookLoader;
pub use normalize::{Normalized, Normalizer};
pub use record::CanonicalRecord;
