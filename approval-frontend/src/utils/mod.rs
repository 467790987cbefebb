pub mod filter;
pub mod jwt;
pub mod validation;
