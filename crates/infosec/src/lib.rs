//! Signer capability contract and W3C Data Integrity proof engine.
//!
//! The `eddsa-jcs-2022` cryptosuite is the only one with verification
//! semantics in this workspace: a proof is produced by hashing the canonical
//! JSON of a proof configuration (the proof object without `proofValue`),
//! hashing the canonical JSON of the payload, concatenating the two digests,
//! and signing the result with Ed25519.

mod proof;
mod signer;

pub use proof::{sign, verify, Proof, ProofError, ProofPurpose, SignOptions, WitnessProof};
pub use signer::{Algorithm, EphemeralSigner, Signer};
