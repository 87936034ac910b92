pub mod lifecycle;
pub mod export;
