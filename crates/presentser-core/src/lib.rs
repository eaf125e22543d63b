pub mod config;
pub mod error;
pub mod input;
pub mod io;
pub mod paths;
pub mod projection;
pub mod quip;
pub mod recover;
pub mod record;
pub mod visits;

pub use error::{PresentserError, Result};
