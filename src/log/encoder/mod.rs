mod console_encoder;
mod core;
mod json_encoder;
mod registry;

pub use self::core::{Encoder, EncoderConfig};
pub use console_encoder::ConsoleEncoder;
pub use json_encoder::JsonEncoder;
pub use registry::{create_encoder, is_registered, register_encoder};
