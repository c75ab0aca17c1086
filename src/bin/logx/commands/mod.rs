// Commands module

pub mod check;
pub mod emit;

pub use check::execute_check;
pub use emit::execute_emit;
