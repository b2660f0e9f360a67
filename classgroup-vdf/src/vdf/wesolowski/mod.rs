// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::class_group::QuadraticForm;
use crate::error::VdfError::{InvalidInput, InvalidProof};
use crate::error::VdfResult;
use crate::math::hash_prime::DefaultPrimalityCheck;
use crate::math::parameterized_group::{
    Doubling, ParameterizedGroupElement, UnknownOrderGroupElement,
};
use crate::vdf::VDF;
use fiat_shamir::{FiatShamir, StrongFiatShamir};
use num_bigint::BigUint;
use num_traits::One;
use std::marker::PhantomData;
use tracing::debug;

pub mod fiat_shamir;

/// Default size in bytes of the Fiat-Shamir challenge used in proving and verification (same as chiavdf).
pub const CHALLENGE_SIZE: usize = 33;

/// An implementation of Wesolowski's VDF construction (https://eprint.iacr.org/2018/623) over a
/// group of unknown order.
pub struct WesolowskisVDF<G: ParameterizedGroupElement + UnknownOrderGroupElement, F: FiatShamir<G>>
{
    group_parameter: G::ParameterType,
    iterations: u64,
    _fiat_shamir: PhantomData<F>,
}

impl<G: ParameterizedGroupElement + UnknownOrderGroupElement, F: FiatShamir<G>>
    WesolowskisVDF<G, F>
{
    /// Create a new VDF using the group defined by the given group parameter. Evaluating this VDF
    /// will require computing `2^iterations * input` which requires `iterations` group operations.
    pub fn new(group_parameter: G::ParameterType, iterations: u64) -> Self {
        Self {
            group_parameter,
            iterations,
            _fiat_shamir: PhantomData::<F>,
        }
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn group_parameter(&self) -> &G::ParameterType {
        &self.group_parameter
    }

    /// Compute `2^iterations * input` by repeated doubling. This is the slow part of the evaluation.
    pub fn compute_delay(&self, input: &G) -> G {
        input.repeated_doubling(self.iterations)
    }

    /// Compute the proof `floor(2^iterations / l) * input` where `l` is the Fiat-Shamir challenge
    /// for the given input and output.
    pub fn prove(&self, input: &G, output: &G) -> VdfResult<G> {
        let challenge = F::compute_challenge(self, input, output)?;
        let quotient = (BigUint::one() << self.iterations) / &challenge;
        Ok(input.mul(&quotient))
    }
}

impl<G: ParameterizedGroupElement + UnknownOrderGroupElement, F: FiatShamir<G>> VDF
    for WesolowskisVDF<G, F>
{
    type InputType = G;
    type OutputType = G;
    type ProofType = G;

    fn evaluate(&self, input: &G) -> VdfResult<(G, G)> {
        if !input.is_in_group(&self.group_parameter) {
            return Err(InvalidInput);
        }
        let output = self.compute_delay(input);
        let proof = self.prove(input, &output)?;
        debug!(iterations = self.iterations, "Evaluated VDF");
        Ok((output, proof))
    }

    fn verify(&self, input: &G, output: &G, proof: &G) -> VdfResult<()> {
        if !input.is_in_group(&self.group_parameter)
            || !output.is_in_group(&self.group_parameter)
            || !proof.is_in_group(&self.group_parameter)
        {
            return Err(InvalidInput);
        }

        let challenge = F::compute_challenge(self, input, output)?;
        let r = BigUint::from(2u8).modpow(&BigUint::from(self.iterations), &challenge);

        if proof.mul(&challenge) + &input.mul(&r) != *output {
            debug!(iterations = self.iterations, "VDF proof rejected");
            return Err(InvalidProof);
        }
        Ok(())
    }
}

/// Implementation of Wesolowski's VDF construction over an imaginary class group using a strong
/// Fiat-Shamir implementation.
pub type DefaultVDF = WesolowskisVDF<
    QuadraticForm,
    StrongFiatShamir<QuadraticForm, CHALLENGE_SIZE, DefaultPrimalityCheck>,
>;
