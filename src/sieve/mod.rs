pub mod ast;
pub mod converter;
pub mod emitter;
