pub mod merge;
pub mod proxy;
pub mod store;
