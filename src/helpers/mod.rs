pub mod string;
pub mod xml;
pub(crate) mod zip;
