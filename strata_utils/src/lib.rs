mod logging;
mod runtime_args;
pub mod signal;

#[cfg(feature = "subscriber")]
pub use logging::init as init_logging;
pub use runtime_args::RuntimeArgs;
pub use signal::{Signal, Subscription};

pub use tracing;
