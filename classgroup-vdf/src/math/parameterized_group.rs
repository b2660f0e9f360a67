// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::error::VdfResult;
use num_bigint::BigUint;
use std::fmt::Debug;
use std::ops::Add;

/// This trait is implemented by types which can be used as parameters for a parameterized group.
/// See [ParameterizedGroupElement].
pub trait Parameter: Eq + Sized {
    /// Compute a random instance of a given size from a seed.
    fn from_seed(seed: &[u8], size_in_bits: usize) -> VdfResult<Self>;
}

/// Trait for group elements with an efficient doubling (squaring in multiplicative notation).
pub trait Doubling: Sized {
    /// Compute 2 * Self.
    fn double(&self) -> Self;

    /// Compute 2^repetitions * Self by repeated doubling. The doublings are inherently sequential.
    fn repeated_doubling(&self, repetitions: u64) -> Self
    where
        Self: Clone,
    {
        let mut result = self.clone();
        for _ in 0..repetitions {
            result = result.double();
        }
        result
    }
}

/// Trait implemented by elements of an additive group where the group is parameterized, for example
/// by the modulus in case of the group being Z mod N or the discriminant in case of class groups.
pub trait ParameterizedGroupElement:
    Sized + Clone + Debug + for<'a> Add<&'a Self, Output = Self> + Eq + Doubling
{
    /// The type of the parameter which uniquely defines this group.
    type ParameterType: Parameter;

    /// Return an instance of the identity element in this group.
    fn zero(parameter: &Self::ParameterType) -> Self;

    /// Return the canonical element used as the input of a VDF in the group defined by `parameter`.
    fn generator(parameter: &Self::ParameterType) -> Self;

    /// Compute scale * self.
    fn mul(&self, scale: &BigUint) -> Self;

    /// Returns true if this is an element of the group defined by `parameter`.
    fn is_in_group(&self, parameter: &Self::ParameterType) -> bool;

    /// Deserialize an element of the group defined by `parameter`. Only canonical encodings as
    /// returned by [ToBytes::to_bytes] are accepted.
    fn from_bytes(bytes: &[u8], parameter: &Self::ParameterType) -> VdfResult<Self>;
}

/// Trait impl'd by elements of groups where the order is unknown.
pub trait UnknownOrderGroupElement {}

/// Serialization to a byte array.
pub trait ToBytes {
    fn to_bytes(&self) -> Vec<u8>;
}
