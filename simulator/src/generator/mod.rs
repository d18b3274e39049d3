pub mod macros;
pub mod trace;
