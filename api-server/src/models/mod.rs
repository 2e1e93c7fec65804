//! Data models

pub mod analysis;
pub mod transaction;
pub mod dashboard;
pub mod management;

pub use analysis::*;
pub use transaction::*;
pub use dashboard::*;
pub use management::*;
