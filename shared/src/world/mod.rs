pub mod authority;
pub mod component;
pub mod error;
pub mod sync;
