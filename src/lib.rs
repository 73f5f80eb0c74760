// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // broker, object store and runner adapters
pub mod config;     // config loading + validation
pub mod engine;     // job state machine
pub mod errors;     // error handling
pub mod observability;
pub mod traits;     // collaborator abstractions
