pub mod error;
pub mod models;
pub mod reading;

pub use error::*;
pub use models::*;
pub use reading::*;
