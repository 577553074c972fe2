pub mod engine;
pub mod message;
pub mod shared;
pub mod topic;

pub use engine::{DispatchReport, Dispatcher};
pub use shared::SharedDispatcher;
pub use topic::Subscriptions;

#[cfg(test)]
mod tests;
