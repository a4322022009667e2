//! Reference [`DiagnosticListener`](crate::DiagnosticListener) implementations.

mod console;
mod filtered;
mod json_lines;
mod memory;

pub use console::ConsoleListener;
pub use filtered::FilteredListener;
pub use json_lines::JsonLinesListener;
pub use memory::MemoryListener;
