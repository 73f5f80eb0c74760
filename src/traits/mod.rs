pub mod broker;
pub mod engine;
pub mod store;

pub use broker::{BrokerSession, InboundDelivery};
pub use engine::WorkflowEngine;
pub use store::{ObjectReader, ObjectRef, ObjectStore};
