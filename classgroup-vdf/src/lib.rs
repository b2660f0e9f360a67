// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0
#![warn(
    future_incompatible,
    nonstandard_style,
    rust_2018_idioms,
    rust_2021_compatibility
)]

//! Wesolowski's verifiable delay function over imaginary class groups.
//!
//! [instance::VdfInstance] is the byte oriented entry point. The generic construction lives in
//! [vdf::wesolowski] and the group arithmetic in [class_group].

pub mod class_group;
pub mod error;
pub mod instance;
pub mod math;
pub mod vdf;

pub use error::{VdfError, VdfResult};
pub use instance::{ExecutionState, OutputReceiver, Seed, VdfInstance, VdfOutput};

#[cfg(test)]
#[path = "tests/vdf_instance_tests.rs"]
pub mod vdf_instance_tests;
