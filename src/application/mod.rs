pub mod ports;
pub mod services;

pub use services::{MutationHandle, OptimisticProjector, QueryRefresher, Reconciler};
