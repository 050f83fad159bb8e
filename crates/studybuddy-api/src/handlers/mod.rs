pub mod extraction;
pub mod formatting;
pub mod persistence;
