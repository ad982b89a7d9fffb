pub mod condition;
pub mod fetch_query;
pub mod filter;
