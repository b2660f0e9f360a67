// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::error::VdfError::ProofConstruction;
use crate::error::VdfResult;
use crate::math::hash_prime::{hash_prime, PrimalityCheck, MAX_PRIME_CANDIDATES};
use crate::math::parameterized_group::{
    ParameterizedGroupElement, ToBytes, UnknownOrderGroupElement,
};
use crate::vdf::wesolowski::WesolowskisVDF;
use num_bigint::BigUint;
use std::marker::PhantomData;
use tracing::debug;

pub trait FiatShamir<G: ParameterizedGroupElement + UnknownOrderGroupElement>: Sized {
    /// Compute the prime modulus used in proving and verification. This is a Fiat-Shamir construction
    /// to make the Wesolowski VDF non-interactive.
    fn compute_challenge(
        vdf: &WesolowskisVDF<G, Self>,
        input: &G,
        output: &G,
    ) -> VdfResult<BigUint>;
}

impl<G, const CHALLENGE_SIZE: usize, P: PrimalityCheck> FiatShamir<G>
    for StrongFiatShamir<G, CHALLENGE_SIZE, P>
where
    G: ParameterizedGroupElement + UnknownOrderGroupElement + ToBytes,
    G::ParameterType: ToBytes,
{
    fn compute_challenge(
        vdf: &WesolowskisVDF<G, Self>,
        input: &G,
        output: &G,
    ) -> VdfResult<BigUint> {
        let mut seed = vec![];

        let input_bytes = input.to_bytes();
        seed.extend_from_slice(&(input_bytes.len() as u64).to_be_bytes());
        seed.extend_from_slice(&input_bytes);

        let output_bytes = output.to_bytes();
        seed.extend_from_slice(&(output_bytes.len() as u64).to_be_bytes());
        seed.extend_from_slice(&output_bytes);

        seed.extend_from_slice(&vdf.iterations().to_be_bytes());
        seed.extend_from_slice(&vdf.group_parameter().to_bytes());

        let challenge = hash_prime::<P>(
            &seed,
            CHALLENGE_SIZE,
            &[0, 8 * CHALLENGE_SIZE - 1],
            MAX_PRIME_CANDIDATES,
        )
        .ok_or(ProofConstruction(MAX_PRIME_CANDIDATES))?;
        debug!(challenge = %challenge, "Computed Fiat-Shamir challenge");
        Ok(challenge)
    }
}

/// Implementation of the Fiat-Shamir challenge generation for usage with Wesolowski's VDF construction.
/// The implementation is strong, meaning that all public parameters are used in the challenge generation.
/// See https://eprint.iacr.org/2023/691.
pub struct StrongFiatShamir<G, const CHALLENGE_SIZE: usize, P> {
    _group: PhantomData<G>,
    _primality_check: PhantomData<P>,
}
