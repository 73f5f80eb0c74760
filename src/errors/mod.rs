// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod broker;
mod config;
mod fetch;
mod store;
mod validation;
mod workflow;
mod workspace;

pub use broker::BrokerError;
pub use config::ConfigError;
pub use fetch::FetchError;
pub use store::StoreError;
pub use validation::ValidationError;
pub use workflow::WorkflowError;
pub use workspace::WorkspaceError;
