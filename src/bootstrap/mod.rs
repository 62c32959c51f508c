pub mod machine;

pub use machine::PreviewBootstrap;
