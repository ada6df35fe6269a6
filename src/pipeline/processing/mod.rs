pub mod assemble;
pub mod clean;
pub mod enrich;
pub mod filter;
