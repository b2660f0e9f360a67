// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! A [VdfInstance] binds a seed and a difficulty to the Wesolowski VDF over the class group derived
//! from the seed. Evaluation is synchronous and works on fixed width byte encodings:
//!
//! ```
//! use classgroup_vdf::instance::VdfInstance;
//!
//! let instance = VdfInstance::new(10, [7u8; 32]);
//! let output = instance.execute().unwrap();
//! assert!(instance.is_finished());
//! assert!(instance.verify(output.as_bytes()));
//! ```
//!
//! Completed executions are also published to any number of [OutputReceiver]s. Publishing never
//! blocks and does not require anyone to listen.

use crate::class_group::discriminant::Discriminant;
use crate::class_group::QuadraticForm;
use crate::error::{VdfError, VdfResult};
use crate::math::parameterized_group::{Parameter, ParameterizedGroupElement, ToBytes};
use crate::vdf::wesolowski::DefaultVDF;
use crate::vdf::VDF;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use serde_with::Bytes;
use std::fmt::{Debug, Formatter};
use std::time::Instant;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Size in bytes of the seed from which the class group is derived.
pub const SEED_SIZE: usize = 32;

/// Bit length of the discriminants derived from seeds.
pub const DISCRIMINANT_SIZE_IN_BITS: usize = 2048;

/// Size in bytes of a serialized group element for a [DISCRIMINANT_SIZE_IN_BITS] bit discriminant.
pub const ELEMENT_SIZE: usize = 258;

/// Size in bytes of a [VdfOutput].
pub const OUTPUT_SIZE: usize = 2 * ELEMENT_SIZE;

pub type Seed = [u8; SEED_SIZE];

/// The result `y` of a VDF evaluation followed by the proof of correctness. Both are serialized
/// group elements of [ELEMENT_SIZE] bytes.
#[serde_as]
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VdfOutput {
    #[serde_as(as = "Bytes")]
    bytes: [u8; OUTPUT_SIZE],
}

impl VdfOutput {
    fn from_elements(result: &QuadraticForm, proof: &QuadraticForm) -> VdfResult<Self> {
        Self::try_from([result.to_bytes(), proof.to_bytes()].concat().as_slice())
    }

    /// The serialized result of the delay computation.
    pub fn result(&self) -> &[u8] {
        &self.bytes[..ELEMENT_SIZE]
    }

    /// The serialized proof.
    pub fn proof(&self) -> &[u8] {
        &self.bytes[ELEMENT_SIZE..]
    }

    pub fn as_bytes(&self) -> &[u8; OUTPUT_SIZE] {
        &self.bytes
    }
}

/// All zeros, which is never a valid output.
impl Default for VdfOutput {
    fn default() -> Self {
        Self {
            bytes: [0u8; OUTPUT_SIZE],
        }
    }
}

impl TryFrom<&[u8]> for VdfOutput {
    type Error = VdfError;

    fn try_from(bytes: &[u8]) -> VdfResult<Self> {
        Ok(Self {
            bytes: bytes
                .try_into()
                .map_err(|_| VdfError::InputLengthWrong(OUTPUT_SIZE))?,
        })
    }
}

impl AsRef<[u8]> for VdfOutput {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl Debug for VdfOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "VdfOutput({})", hex::encode(self.bytes))
    }
}

/// The execution state of a [VdfInstance].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExecutionState {
    /// No execution is in progress and there was none, or the one which ended last failed.
    #[default]
    Idle,
    /// At least one execution is in progress.
    Running,
    /// No execution is in progress and the one which ended last completed.
    Finished,
}

/// Everything observable about an instance. It is replaced as a whole, so readers never see an
/// output that does not belong to a completed execution.
#[derive(Clone, Copy, Debug, Default)]
struct State {
    /// Number of executions in progress.
    running: usize,
    /// Whether the most recently ended execution completed.
    finished: bool,
    output: VdfOutput,
    /// Number of completed executions.
    completed: u64,
}

impl State {
    fn execution(&self) -> ExecutionState {
        if self.running > 0 {
            ExecutionState::Running
        } else if self.finished {
            ExecutionState::Finished
        } else {
            ExecutionState::Idle
        }
    }
}

/// A VDF with a fixed seed and difficulty. The instance may be executed any number of times and
/// shared between threads.
pub struct VdfInstance {
    seed: Seed,
    difficulty: u32,
    vdf: OnceCell<DefaultVDF>,
    state: watch::Sender<State>,
}

impl VdfInstance {
    /// Create an idle instance. The class group is derived lazily on first use.
    pub fn new(difficulty: u32, seed: Seed) -> Self {
        let (state, _) = watch::channel(State::default());
        Self {
            seed,
            difficulty,
            vdf: OnceCell::new(),
            state,
        }
    }

    pub fn seed(&self) -> &Seed {
        &self.seed
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    fn vdf(&self) -> VdfResult<&DefaultVDF> {
        self.vdf.get_or_try_init(|| {
            let discriminant = Discriminant::from_seed(&self.seed, DISCRIMINANT_SIZE_IN_BITS)?;
            Ok(DefaultVDF::new(discriminant, self.difficulty.into()))
        })
    }

    /// Evaluate the VDF on the generator of the class group derived from the seed. Blocks until
    /// all `difficulty` squarings are done.
    pub fn execute(&self) -> VdfResult<VdfOutput> {
        self.run(|discriminant| Ok(QuadraticForm::generator(discriminant)))
    }

    /// Evaluate the VDF starting from a serialized element of the class group derived from the
    /// seed, e.g. the result of a previous execution. Fails if `start` is not a canonical encoding
    /// of such an element.
    pub fn execute_iteration(&self, start: &[u8]) -> VdfResult<VdfOutput> {
        self.run(|discriminant| QuadraticForm::from_bytes(start, discriminant))
    }

    fn run(
        &self,
        input: impl FnOnce(&Discriminant) -> VdfResult<QuadraticForm>,
    ) -> VdfResult<VdfOutput> {
        self.state.send_modify(|state| state.running += 1);
        let timer = Instant::now();

        match self.evaluate(input) {
            Ok(output) => {
                self.state.send_modify(|state| {
                    state.running -= 1;
                    state.finished = true;
                    state.output = output;
                    state.completed += 1;
                });
                info!(
                    difficulty = self.difficulty,
                    elapsed_ms = timer.elapsed().as_millis() as u64,
                    "VDF execution finished"
                );
                Ok(output)
            }
            Err(e) => {
                self.state.send_modify(|state| {
                    state.running -= 1;
                    state.finished = false;
                });
                warn!(difficulty = self.difficulty, error = %e, "VDF execution failed");
                Err(e)
            }
        }
    }

    fn evaluate(
        &self,
        input: impl FnOnce(&Discriminant) -> VdfResult<QuadraticForm>,
    ) -> VdfResult<VdfOutput> {
        let vdf = self.vdf()?;
        let input = input(vdf.group_parameter())?;
        let (result, proof) = vdf.evaluate(&input)?;
        VdfOutput::from_elements(&result, &proof)
    }

    /// Returns true if `output` is a valid output of this instance, i.e. a result and a proof for
    /// an evaluation starting from the generator. Malformed input is rejected.
    pub fn verify(&self, output: &[u8]) -> bool {
        self.check(|discriminant| Ok(QuadraticForm::generator(discriminant)), output)
    }

    /// Returns true if `output` is a valid output of an evaluation of this instance starting from
    /// the serialized element `start`. Malformed input is rejected.
    pub fn verify_iteration(&self, start: &[u8], output: &[u8]) -> bool {
        self.check(
            |discriminant| QuadraticForm::from_bytes(start, discriminant),
            output,
        )
    }

    fn check(
        &self,
        input: impl FnOnce(&Discriminant) -> VdfResult<QuadraticForm>,
        output: &[u8],
    ) -> bool {
        let verify = || -> VdfResult<()> {
            let output = VdfOutput::try_from(output)?;
            let vdf = self.vdf()?;
            let discriminant = vdf.group_parameter();
            let input = input(discriminant)?;
            let result = QuadraticForm::from_bytes(output.result(), discriminant)?;
            let proof = QuadraticForm::from_bytes(output.proof(), discriminant)?;
            vdf.verify(&input, &result, &proof)
        };
        match verify() {
            Ok(()) => true,
            Err(e) => {
                debug!(difficulty = self.difficulty, error = %e, "VDF output rejected");
                false
            }
        }
    }

    pub fn state(&self) -> ExecutionState {
        self.state.borrow().execution()
    }

    /// Returns true if no execution is in progress and the one which ended last completed.
    pub fn is_finished(&self) -> bool {
        self.state() == ExecutionState::Finished
    }

    /// The output of the last completed execution, or all zeros if there is none. If an execution
    /// is running or the last one failed, this is the output of an earlier execution.
    pub fn output(&self) -> VdfOutput {
        self.state.borrow().output
    }

    /// Subscribe to completed executions. The receiver first yields the output of the last
    /// completed execution if there was one, and after that every output completed later. If
    /// executions complete faster than they are received, only the latest is delivered.
    pub fn output_receiver(&self) -> OutputReceiver {
        OutputReceiver {
            receiver: self.state.subscribe(),
            last_seen: 0,
        }
    }
}

/// Receives the outputs of completed executions of a [VdfInstance].
pub struct OutputReceiver {
    receiver: watch::Receiver<State>,
    last_seen: u64,
}

impl OutputReceiver {
    /// Wait for the next completed execution. Returns `None` once the instance has been dropped
    /// and all its outputs have been received.
    pub async fn recv(&mut self) -> Option<VdfOutput> {
        let last_seen = self.last_seen;
        let (completed, output) = {
            let state = self
                .receiver
                .wait_for(|state| state.completed > last_seen)
                .await
                .ok()?;
            (state.completed, state.output)
        };
        self.last_seen = completed;
        Some(output)
    }
}
