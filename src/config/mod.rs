//! Configuration: environment settings and fixed constants (paths, form
//! messages, cache keys, limits).

mod constants;
mod settings;

pub use constants::*;
pub use settings::Config;
