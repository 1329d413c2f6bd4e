pub mod core;
pub mod crud;
pub mod reactive;

pub use core::NosqlRepository;
