pub mod ast;
pub mod handle;
