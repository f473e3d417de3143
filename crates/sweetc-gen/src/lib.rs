//! NASM x86-64 code generation, the final pipeline stage (spec §4.6).

mod codegen;
mod error;

pub use codegen::generate;
pub use error::CodegenError;
