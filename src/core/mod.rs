pub mod acquire;
pub mod calibration;
pub mod check;
pub mod compression;
pub mod constants;
pub mod error;
pub mod fit;
pub mod format;
pub mod inverse;
pub mod inversion;
pub mod summary;
