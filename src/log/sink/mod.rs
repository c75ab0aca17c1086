mod console_sink;
mod memory_sink;
mod open;
mod rolling_file_sink;
mod trait_;

pub use console_sink::{ConsoleSink, ConsoleSinkConfig, Target};
pub use memory_sink::MemorySink;
pub use open::{open_sink, open_sinks};
pub use rolling_file_sink::{RollingFileSink, RollingFileSinkConfig};
pub use trait_::WriteSink;
