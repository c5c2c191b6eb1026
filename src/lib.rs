pub mod dense;
pub mod error;
pub mod lid;
pub mod spectrum;
pub mod svd;

pub use error::{LidError, Result};
pub use lid::{Estimate, LocalPca, LocalPcaBuilder, LocalPcaConfig, PcaVersion};
pub use spectrum::Spectrum;
pub use svd::Decomposition;
