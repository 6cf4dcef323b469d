pub mod logging;

pub use logging::{init_tracing, log_level_from};
