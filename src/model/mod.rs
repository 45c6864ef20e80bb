pub mod enums;
pub mod rule;
