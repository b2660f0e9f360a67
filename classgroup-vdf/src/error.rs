// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Errors returned by the VDF.
//!
//! Evaluation surfaces every failure to its caller. Verification of untrusted bytes never does:
//! the byte-level verification functions collapse any [VdfError] into `false`.

use thiserror::Error;

pub type VdfResult<T> = Result<T, VdfError>;

/// Collection of errors returned by the VDF.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum VdfError {
    /// The seed material does not define a valid class group.
    #[error("The seed does not define a valid class group")]
    InvalidGroup,

    /// Input length is wrong.
    #[error("Expected input of length exactly {0}")]
    InputLengthWrong(usize),

    /// The bytes are not the canonical encoding of an element of the expected group.
    #[error("The bytes do not encode a reduced quadratic form of the expected discriminant")]
    InvalidEncoding,

    /// No challenge prime was found among the allowed number of candidates.
    #[error("No prime found among the first {0} challenge candidates")]
    ProofConstruction(usize),

    /// Invalid value was given to the function
    #[error("Invalid value was given to the function")]
    InvalidInput,

    /// Invalid proof was given to the function
    #[error("Invalid proof was given to the function")]
    InvalidProof,
}
