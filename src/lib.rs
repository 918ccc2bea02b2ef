pub mod args;
pub mod config;
pub mod corpus;
pub mod dict;
pub mod duplex;
pub mod enrich;
pub mod error;
pub mod grade;
pub mod lookup;
pub mod pipeline;
pub mod rank;
pub mod store;
pub mod tokenize;

pub use error::{Error, Result};
