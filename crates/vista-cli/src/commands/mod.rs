pub mod query;
pub mod serve;
