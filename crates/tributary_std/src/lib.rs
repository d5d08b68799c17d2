//! A library of standard nodes for tributary.

pub use self::log::Output;
pub use number::Int;
pub use ops::Add;

pub mod log;
pub mod number;
pub mod ops;
