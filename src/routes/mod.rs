mod health_check;
mod subscribers;

pub use health_check::*;
pub use subscribers::*;
