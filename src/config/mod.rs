pub mod options;
pub mod paths;
