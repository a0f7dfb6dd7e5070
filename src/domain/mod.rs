pub mod closure;
pub mod error;
pub mod id;
pub mod money;
pub mod provider;
pub mod register;
