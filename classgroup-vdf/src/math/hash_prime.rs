// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! This module contains an implementation of the HashPrime function from
//! [chiavdf](https://github.com/Chia-Network/chiavdf/blob/bcc36af3a8de4d2fcafa571602040a4ebd4bdd56/src/proof_common.h#L14-L43)
//! with an explicit bound on the number of candidates which are tested.

use num_bigint::BigUint;
use num_prime::nt_funcs::is_prime;
use num_prime::PrimalityTestConfig;
use sha2::{Digest, Sha256};
use std::cmp::min;

/// The number of candidates [hash_prime] tests before giving up. Both for the 264 bit challenges and
/// for 2048 bit discriminants, the probability that all candidates are composite is below 2^{-40}.
pub const MAX_PRIME_CANDIDATES: usize = 20_000;

/// Infinite iterator over the prime candidates derived from a seed. Each candidate consumes one or
/// more increments of the seed, interpreted as a big-endian counter.
struct HashPrimeIterator {
    seed: Vec<u8>,
    length_in_bytes: usize,
    bitmask: Vec<usize>,
}

impl Iterator for HashPrimeIterator {
    type Item = BigUint;

    fn next(&mut self) -> Option<Self::Item> {
        let mut blob = Vec::with_capacity(self.length_in_bytes);
        while blob.len() < self.length_in_bytes {
            for i in (0..self.seed.len()).rev() {
                self.seed[i] = self.seed[i].wrapping_add(1);
                if self.seed[i] != 0 {
                    break;
                }
            }
            let hash = Sha256::digest(&self.seed);
            blob.extend_from_slice(&hash[..min(hash.len(), self.length_in_bytes - blob.len())]);
        }
        let mut x = BigUint::from_bytes_be(&blob);
        for b in &self.bitmask {
            x.set_bit(*b as u64, true);
        }
        Some(x)
    }
}

/// Implementation of a probabilistic primality test.
pub trait PrimalityCheck {
    /// Return true if `x` is probably a prime. If `false` is returned, `x` is guaranteed to be composite.
    fn is_prime(x: &BigUint) -> bool;
}

/// Primality check using the Baillie-PSW test from `num_prime`. An adversary may choose the input to
/// the Fiat-Shamir challenge, so we follow "Prime and Prejudice: Primality Testing Under Adversarial
/// Conditions" by Albrecht et al. (https://eprint.iacr.org/2018/749).
pub struct DefaultPrimalityCheck {}

impl PrimalityCheck for DefaultPrimalityCheck {
    fn is_prime(x: &BigUint) -> bool {
        is_prime(x, Some(PrimalityTestConfig::bpsw())).probably()
    }
}

/// Generates a pseudo-prime using the hash and check method: Deterministically choose x with
/// `8 * length_in_bytes` bits from the seed, set the bits in `bitmask`, and return x if it is a
/// pseudo-prime. Otherwise repeat with the next candidate.
///
/// Returns `None` if none of the first `max_candidates` candidates is a pseudo-prime.
pub fn hash_prime<P: PrimalityCheck>(
    seed: &[u8],
    length_in_bytes: usize,
    bitmask: &[usize],
    max_candidates: usize,
) -> Option<BigUint> {
    hash_prime_with_index::<P>(seed, length_in_bytes, bitmask, max_candidates).map(|(_, p)| p)
}

/// Like [hash_prime] but also returns the index of the prime among the candidates.
pub fn hash_prime_with_index<P: PrimalityCheck>(
    seed: &[u8],
    length_in_bytes: usize,
    bitmask: &[usize],
    max_candidates: usize,
) -> Option<(usize, BigUint)> {
    HashPrimeIterator {
        seed: seed.to_vec(),
        length_in_bytes,
        bitmask: bitmask.to_vec(),
    }
    .take(max_candidates)
    .enumerate()
    .find(|(_, x)| P::is_prime(x))
}

/// Implementation of [hash_prime] using [DefaultPrimalityCheck] and [MAX_PRIME_CANDIDATES].
pub fn hash_prime_default(seed: &[u8], length_in_bytes: usize, bitmask: &[usize]) -> Option<BigUint> {
    hash_prime::<DefaultPrimalityCheck>(seed, length_in_bytes, bitmask, MAX_PRIME_CANDIDATES)
}
