pub mod http;
pub mod search;
