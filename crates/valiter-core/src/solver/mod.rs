pub mod config;
pub mod error;
pub mod ids;
pub mod interner;
pub mod policy;
pub mod process;
pub mod snapshot;
pub mod solution;
pub mod table;
pub mod validate;
pub mod value_iteration;

#[cfg(test)]
mod tests;
