#![no_main]
use ciborium::de::from_reader;
use itsuku_proof::Proof;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(proof) = from_reader::<Proof, _>(data) {
        // Decoding arbitrary bytes into a structurally valid `Proof` must
        // never panic on verification, regardless of how implausible the
        // disclosed antecedents or opening are.
        let _ = itsuku_proof::proof_verify(&proof);
    }
});
