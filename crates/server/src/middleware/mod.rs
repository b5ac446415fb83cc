mod logging;

pub use logging::log_traffic;
