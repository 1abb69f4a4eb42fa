pub mod filter;
pub mod simplify;
pub mod sorting;
