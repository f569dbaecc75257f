pub mod account;
pub mod client;
pub mod execution;
pub mod news;

pub use client::{AlpacaClient, Api};
pub use news::NEWS_PAGE_LIMIT;
