//! Randomness for public-key encryption
//!
//! Key material comes from tfhe's generators; the two error polynomials of
//! a public-key encryption are drawn here.

use rand::{Rng, RngCore, rngs::OsRng};
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;
use rand_distr::Normal;
use tfhe::core_crypto::prelude::*;

use crate::error::{RlweError, RlweResult};

/// ChaCha20 stream seeded from the OS CSPRNG
pub(crate) fn os_seeded_rng() -> ChaCha20Rng {
    let mut seed = [0u8; 32];
    OsRng.fill_bytes(&mut seed);
    ChaCha20Rng::from_seed(seed)
}

/// Binary polynomial from tfhe's secret generator
pub(crate) fn binary(degree: usize) -> Polynomial<Vec<u128>> {
    let mut seeder = new_seeder();
    let mut secret_generator =
        SecretRandomGenerator::<ActivatedRandomGenerator>::new(seeder.as_mut().seed());
    let key: GlweSecretKeyOwned<u128> = allocate_and_generate_new_binary_glwe_secret_key(
        GlweDimension(1),
        PolynomialSize(degree),
        &mut secret_generator,
    );
    Polynomial::from_container(key.as_ref().to_vec())
}

/// Rounded Gaussian error polynomial
pub(crate) fn gaussian<R: Rng>(
    degree: usize,
    std_dev: f64,
    rng: &mut R,
) -> RlweResult<Polynomial<Vec<u128>>> {
    let normal = Normal::new(0.0, std_dev).map_err(|e| RlweError::Sampling(e.to_string()))?;
    let coeffs = (0..degree)
        .map(|_| rng.sample(normal).round() as i128 as u128)
        .collect();
    Ok(Polynomial::from_container(coeffs))
}
