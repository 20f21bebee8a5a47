pub mod error;
pub mod types;

pub mod cache;
pub mod intent;
pub mod mutation;
pub mod online;
pub mod reactive;
pub mod remote;
