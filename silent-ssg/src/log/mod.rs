pub use tracing::{Level, debug, error, info, trace, warn};
pub use tracing_subscriber as logger;
