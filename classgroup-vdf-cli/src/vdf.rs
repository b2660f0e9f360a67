// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use clap::Parser;
use classgroup_vdf::class_group::discriminant::Discriminant;
use classgroup_vdf::instance::{Seed, VdfInstance, DISCRIMINANT_SIZE_IN_BITS};
use classgroup_vdf::math::parameterized_group::{Parameter, ToBytes};
use std::io::{Error, ErrorKind};

#[derive(Parser)]
#[command(name = "vdf-cli")]
#[command(about = "Verifiable delay function using Wesolowski's construction over imaginary class groups", long_about = None)]
enum Command {
    /// Derive the discriminant of a class group from a seed.
    Discriminant(DiscriminantArguments),

    /// Compute VDF output and proof.
    Evaluate(EvaluateArguments),

    /// Verify an output.
    Verify(VerifyArguments),
}

#[derive(Parser, Clone)]
struct DiscriminantArguments {
    /// The hex encoded seed.
    #[clap(short, long)]
    seed: String,

    /// Bit length of the discriminant (default is 2048).
    #[clap(short, long, default_value_t = DISCRIMINANT_SIZE_IN_BITS)]
    bit_length: usize,
}

#[derive(Parser, Clone)]
struct EvaluateArguments {
    /// The hex encoded 32 byte seed.
    #[clap(short, long)]
    seed: String,

    /// The number of squarings.
    #[clap(short, long)]
    difficulty: u32,

    /// Hex encoded element to start from instead of the generator, e.g. the result of a previous
    /// evaluation.
    #[clap(long)]
    start: Option<String>,
}

#[derive(Parser, Clone)]
struct VerifyArguments {
    /// The hex encoded 32 byte seed.
    #[clap(short, long)]
    seed: String,

    /// The number of squarings.
    #[clap(short, long)]
    difficulty: u32,

    /// The hex encoded output of the VDF, the result followed by the proof.
    #[clap(short, long)]
    output: String,

    /// Hex encoded element the evaluation started from if it was not the generator.
    #[clap(long)]
    start: Option<String>,
}

fn main() {
    match execute(Command::parse()) {
        Ok(res) => {
            println!("{}", res);
            std::process::exit(exitcode::OK);
        }
        Err(e) => {
            println!("Error: {}", e);
            std::process::exit(exitcode::DATAERR);
        }
    }
}

fn parse_seed(seed: &str) -> Result<Seed, Error> {
    hex::decode(seed)
        .ok()
        .and_then(|bytes| Seed::try_from(bytes).ok())
        .ok_or_else(|| Error::new(ErrorKind::InvalidInput, "Invalid seed."))
}

fn parse_start(start: Option<String>) -> Result<Option<Vec<u8>>, Error> {
    start
        .map(hex::decode)
        .transpose()
        .map_err(|_| Error::new(ErrorKind::InvalidInput, "Invalid start hex string."))
}

fn execute(cmd: Command) -> Result<String, Error> {
    match cmd {
        Command::Discriminant(arguments) => {
            let seed = hex::decode(arguments.seed)
                .map_err(|_| Error::new(ErrorKind::InvalidInput, "Invalid seed."))?;
            let discriminant = Discriminant::from_seed(&seed, arguments.bit_length)
                .map_err(|_| Error::new(ErrorKind::InvalidInput, "Invalid bit length."))?;
            let mut result = "Discriminant: ".to_string();
            result.push_str(&hex::encode(discriminant.to_bytes()));
            Ok(result)
        }

        Command::Evaluate(arguments) => {
            let seed = parse_seed(&arguments.seed)?;
            let start = parse_start(arguments.start)?;

            let instance = VdfInstance::new(arguments.difficulty, seed);
            let output = match start {
                Some(start) => instance.execute_iteration(&start),
                None => instance.execute(),
            }
            .map_err(|e| {
                Error::new(
                    ErrorKind::InvalidInput,
                    format!("VDF evaluation failed: {}", e),
                )
            })?;

            let mut result = "Output: ".to_string();
            result.push_str(&hex::encode(output.as_bytes()));
            Ok(result)
        }

        Command::Verify(arguments) => {
            let seed = parse_seed(&arguments.seed)?;
            let start = parse_start(arguments.start)?;
            let output = hex::decode(arguments.output)
                .map_err(|_| Error::new(ErrorKind::InvalidInput, "Invalid output hex string."))?;

            let instance = VdfInstance::new(arguments.difficulty, seed);
            let verifies = match start {
                Some(start) => instance.verify_iteration(&start, &output),
                None => instance.verify(&output),
            };

            let mut result = "Verified: ".to_string();
            result.push_str(&verifies.to_string());
            Ok(result)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{execute, Command, DiscriminantArguments, EvaluateArguments, VerifyArguments};
    use classgroup_vdf::class_group::discriminant::Discriminant;
    use classgroup_vdf::instance::{VdfInstance, OUTPUT_SIZE};
    use classgroup_vdf::math::parameterized_group::{Parameter, ToBytes};

    const SEED: &str = "0101010101010101010101010101010101010101010101010101010101010101";

    fn evaluate(difficulty: u32, start: Option<String>) -> String {
        let result = execute(Command::Evaluate(EvaluateArguments {
            seed: SEED.to_string(),
            difficulty,
            start,
        }))
        .unwrap();
        result.strip_prefix("Output: ").unwrap().to_string()
    }

    fn verify(difficulty: u32, output: String, start: Option<String>) -> String {
        execute(Command::Verify(VerifyArguments {
            seed: SEED.to_string(),
            difficulty,
            output,
            start,
        }))
        .unwrap()
    }

    #[test]
    fn test_discriminant() {
        let result = execute(Command::Discriminant(DiscriminantArguments {
            seed: "abcd".to_string(),
            bit_length: 1024,
        }))
        .unwrap();
        let discriminant = Discriminant::from_seed(&[0xab, 0xcd], 1024).unwrap();
        let expected = format!("Discriminant: {}", hex::encode(discriminant.to_bytes()));
        assert_eq!(expected, result);

        assert!(execute(Command::Discriminant(DiscriminantArguments {
            seed: "abcd".to_string(),
            bit_length: 1001,
        }))
        .is_err());
        assert!(execute(Command::Discriminant(DiscriminantArguments {
            seed: "not hex".to_string(),
            bit_length: 1024,
        }))
        .is_err());
    }

    #[test]
    fn test_evaluate() {
        let output = evaluate(20, None);
        assert_eq!(2 * OUTPUT_SIZE, output.len());

        let instance = VdfInstance::new(20, [1u8; 32]);
        assert_eq!(
            hex::encode(instance.execute().unwrap().as_bytes()),
            output
        );
    }

    #[test]
    fn test_verify() {
        let output = evaluate(20, None);
        assert_eq!("Verified: true", verify(20, output.clone(), None));
        assert_eq!("Verified: false", verify(21, output.clone(), None));
        assert_eq!("Verified: false", verify(20, output[2..].to_string(), None));

        assert!(execute(Command::Verify(VerifyArguments {
            seed: SEED.to_string(),
            difficulty: 20,
            output: "xyz".to_string(),
            start: None,
        }))
        .is_err());
    }

    #[test]
    fn test_iteration() {
        let first = evaluate(10, None);
        let start = first[..OUTPUT_SIZE].to_string();
        let second = evaluate(15, Some(start.clone()));
        assert_eq!(
            "Verified: true",
            verify(15, second.clone(), Some(start.clone()))
        );
        assert_eq!("Verified: false", verify(15, second.clone(), None));

        let direct = evaluate(25, None);
        assert_eq!(direct[..OUTPUT_SIZE], second[..OUTPUT_SIZE]);

        // The start must be an element of the class group.
        assert!(execute(Command::Evaluate(EvaluateArguments {
            seed: SEED.to_string(),
            difficulty: 15,
            start: Some("00".repeat(258)),
        }))
        .is_err());
    }

    #[test]
    fn test_invalid_seed() {
        assert!(execute(Command::Evaluate(EvaluateArguments {
            seed: "0101".to_string(),
            difficulty: 1,
            start: None,
        }))
        .is_err());
        assert!(execute(Command::Verify(VerifyArguments {
            seed: "zz".to_string(),
            difficulty: 1,
            output: "00".to_string(),
            start: None,
        }))
        .is_err());
    }
}
