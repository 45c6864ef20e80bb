pub mod condition;
pub mod parser;
