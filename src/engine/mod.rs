pub mod acknowledgment;
pub mod dispatcher;
pub mod executor;
pub mod fetcher;
pub mod shutdown;
pub mod validator;
pub mod workspace;

pub use acknowledgment::{AcknowledgmentPolicy, PendingAck};
pub use dispatcher::{DispatcherSettings, JobDispatcher, JobOutcome, JobReport, RunSummary};
pub use executor::{WorkflowExecutor, WorkflowInvocation, WorkflowOutcome};
pub use fetcher::{FetchSummary, PayloadFetcher, StagedObject};
pub use shutdown::{Shutdown, ShutdownMode};
pub use validator::{InboundEvent, MessageValidator};
pub use workspace::JobWorkspace;
