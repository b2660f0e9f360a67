// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::class_group::discriminant::Discriminant;
use crate::class_group::QuadraticForm;
use crate::error::VdfError;
use crate::instance::{
    ExecutionState, VdfInstance, VdfOutput, DISCRIMINANT_SIZE_IN_BITS, ELEMENT_SIZE, OUTPUT_SIZE,
    SEED_SIZE,
};
use crate::math::parameterized_group::{
    Doubling, Parameter, ParameterizedGroupElement, ToBytes,
};
use once_cell::sync::Lazy;
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

const SEED: [u8; SEED_SIZE] = [0x2a; SEED_SIZE];

/// An instance which has been executed once, shared by the tests which only verify.
static EXECUTED: Lazy<(VdfInstance, VdfOutput)> = Lazy::new(|| {
    let instance = VdfInstance::new(100, SEED);
    let output = instance.execute().unwrap();
    (instance, output)
});

#[test]
fn test_execute_and_verify() {
    let (instance, output) = &*EXECUTED;
    assert!(instance.is_finished());
    assert_eq!(*output, instance.output());
    assert!(instance.verify(output.as_bytes()));

    // Another instance with the same seed and difficulty accepts the output too.
    assert!(VdfInstance::new(100, SEED).verify(output.as_bytes()));

    // But not with a different difficulty or seed.
    assert!(!VdfInstance::new(99, SEED).verify(output.as_bytes()));
    assert!(!VdfInstance::new(100, [0x2b; SEED_SIZE]).verify(output.as_bytes()));
}

#[test]
fn test_idle_instance() {
    let instance = VdfInstance::new(1000, SEED);
    assert!(!instance.is_finished());
    assert_eq!(ExecutionState::Idle, instance.state());
    assert_eq!([0u8; OUTPUT_SIZE], *instance.output().as_bytes());
    assert_eq!(1000, instance.difficulty());
    assert_eq!(&SEED, instance.seed());

    // The all zero output is not valid.
    assert!(!instance.verify(instance.output().as_bytes()));
}

#[test]
fn test_zero_difficulty() {
    let instance = VdfInstance::new(0, SEED);
    let output = instance.execute().unwrap();

    let discriminant = Discriminant::from_seed(&SEED, DISCRIMINANT_SIZE_IN_BITS).unwrap();
    let generator = QuadraticForm::generator(&discriminant);
    assert_eq!(generator.to_bytes(), output.result());
    assert_eq!(QuadraticForm::zero(&discriminant).to_bytes(), output.proof());
    assert!(instance.verify(output.as_bytes()));
}

#[test]
fn test_iteration_equivalence() {
    let first = VdfInstance::new(40, SEED);
    let intermediate = first.execute().unwrap();

    let second = VdfInstance::new(60, SEED);
    let chained = second.execute_iteration(intermediate.result()).unwrap();
    assert!(second.verify_iteration(intermediate.result(), chained.as_bytes()));

    let direct_instance = VdfInstance::new(100, SEED);
    let direct = direct_instance.execute().unwrap();
    assert!(direct_instance.verify(direct.as_bytes()));
    assert_eq!(direct.result(), chained.result());

    // The chained output is not an output for the generator.
    assert!(!second.verify(chained.as_bytes()));
    assert!(!direct_instance.verify_iteration(intermediate.result(), direct.as_bytes()));
}

#[test]
fn test_determinism() {
    let (_, output) = &*EXECUTED;
    let instance = VdfInstance::new(100, SEED);
    assert_eq!(*output, instance.execute().unwrap());

    // Executing again replaces the output with an identical one.
    assert_eq!(*output, instance.execute().unwrap());
    assert!(instance.is_finished());
    assert!(instance.verify(instance.output().as_bytes()));
}

#[test]
fn test_malformed_input() {
    let (instance, output) = &*EXECUTED;
    let bytes = output.as_bytes();

    assert!(!instance.verify(&[]));
    assert!(!instance.verify(&bytes[1..]));
    assert!(!instance.verify(&[bytes.as_slice(), &[0]].concat()));
    assert!(!instance.verify(&[0xff; OUTPUT_SIZE]));

    let discriminant = Discriminant::from_seed(&SEED, DISCRIMINANT_SIZE_IN_BITS).unwrap();
    let start = QuadraticForm::generator(&discriminant).to_bytes();
    assert!(instance.verify_iteration(&start, bytes));
    assert!(!instance.verify_iteration(&start[1..], bytes));
    assert!(!instance.verify_iteration(&[start.clone(), vec![0]].concat(), bytes));
    assert!(!instance.verify_iteration(&[0u8; ELEMENT_SIZE], bytes));
    assert!(!instance.verify_iteration(&start, &bytes[..ELEMENT_SIZE]));
}

#[test]
fn test_invalid_start() {
    let instance = VdfInstance::new(10, SEED);
    assert_eq!(
        Err(VdfError::InputLengthWrong(ELEMENT_SIZE)),
        instance.execute_iteration(&[1u8; 100])
    );

    // A valid element of another class group.
    let other = Discriminant::from_seed(&[0x2b; SEED_SIZE], DISCRIMINANT_SIZE_IN_BITS).unwrap();
    let start = QuadraticForm::generator(&other)
        .repeated_doubling(5)
        .to_bytes();
    assert_eq!(
        Err(VdfError::InvalidEncoding),
        instance.execute_iteration(&start)
    );
    assert!(!instance.is_finished());
    assert_eq!(VdfOutput::default(), instance.output());
}

#[test]
fn test_serde() {
    let (_, output) = &*EXECUTED;
    let serialized = bcs::to_bytes(output).unwrap();
    assert_eq!(output.as_bytes().as_slice(), &serialized[serialized.len() - OUTPUT_SIZE..]);
    let deserialized: VdfOutput = bcs::from_bytes(&serialized).unwrap();
    assert_eq!(*output, deserialized);

    assert!(bcs::from_bytes::<VdfOutput>(&serialized[..serialized.len() - 1]).is_err());
}

#[test]
fn test_instance_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<VdfInstance>();
}

#[tokio::test]
async fn test_completion_delivery() {
    let instance = Arc::new(VdfInstance::new(50, SEED));
    let mut receiver = instance.output_receiver();

    let executor = instance.clone();
    let output = tokio::task::spawn_blocking(move || executor.execute())
        .await
        .unwrap()
        .unwrap();

    let received = tokio::time::timeout(Duration::from_secs(10), receiver.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(output, received);
    assert_eq!(instance.output(), received);

    // Each completion is received once.
    assert!(
        tokio::time::timeout(Duration::from_millis(100), receiver.recv())
            .await
            .is_err()
    );

    // A receiver created after the execution still gets the last output.
    let mut late_receiver = instance.output_receiver();
    assert_eq!(Some(output), late_receiver.recv().await);

    // Dropping the instance closes the receivers.
    drop(instance);
    assert_eq!(None, receiver.recv().await);
}

#[tokio::test]
async fn test_failed_execution_is_not_published() {
    let instance = VdfInstance::new(10, SEED);
    let mut receiver = instance.output_receiver();
    assert!(instance.execute_iteration(&[0u8; 3]).is_err());
    assert!(
        tokio::time::timeout(Duration::from_millis(100), receiver.recv())
            .await
            .is_err()
    );
}

#[test]
fn test_overlapping_executions() {
    let instance = Arc::new(VdfInstance::new(3000, SEED));

    let first = {
        let instance = instance.clone();
        std::thread::spawn(move || instance.execute())
    };
    while instance.state() != ExecutionState::Running {
        std::thread::sleep(Duration::from_millis(1));
    }

    // A call failing while another one is squaring does not end the running state.
    assert!(instance.execute_iteration(&[0u8; 3]).is_err());
    assert_eq!(ExecutionState::Running, instance.state());
    assert!(!instance.is_finished());
    assert_eq!(VdfOutput::default(), instance.output());

    let second = {
        let instance = instance.clone();
        std::thread::spawn(move || instance.execute())
    };
    let first = first.join().unwrap().unwrap();
    let second = second.join().unwrap().unwrap();

    assert_eq!(first, second);
    assert_eq!(ExecutionState::Finished, instance.state());
    assert_eq!(first, instance.output());
    assert!(instance.verify(instance.output().as_bytes()));
}

#[test]
fn test_execution_without_receivers() {
    let instance = VdfInstance::new(5, SEED);
    let receiver = instance.output_receiver();
    drop(receiver);
    for _ in 0..3 {
        let output = instance.execute().unwrap();
        assert_eq!(output, instance.output());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]
    #[test]
    fn test_tampered_output(bit in 0..8 * OUTPUT_SIZE) {
        let (instance, output) = &*EXECUTED;
        let mut bytes = *output.as_bytes();
        bytes[bit / 8] ^= 1 << (bit % 8);
        prop_assert!(!instance.verify(&bytes));
    }
}
