mod artifact;
mod regressor;

pub use artifact::{ModelArtifact, load};
pub use regressor::{PredictError, Regressor};
