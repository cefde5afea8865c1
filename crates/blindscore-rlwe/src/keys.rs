//! RLWE key material on tfhe's GLWE entities

use tfhe::core_crypto::prelude::*;
use zeroize::Zeroize;

use crate::error::{RlweError, RlweResult};
use crate::glwe::{self, Glwe};
use crate::params::{MODULUS_BITS, RlweParams};
use crate::wire::ByteReader;

/// Binary GLWE secret key of dimension one (zeroized on drop)
#[derive(Clone)]
pub struct SecretKey {
    key: GlweSecretKeyOwned<u128>,
}

impl SecretKey {
    /// Generate a new random secret key
    pub fn generate(params: &RlweParams) -> Self {
        let mut seeder = new_seeder();
        let seeder_ref = seeder.as_mut();
        let mut secret_generator =
            SecretRandomGenerator::<ActivatedRandomGenerator>::new(seeder_ref.seed());

        let key = allocate_and_generate_new_binary_glwe_secret_key(
            GlweDimension(1),
            params.polynomial_size(),
            &mut secret_generator,
        );
        Self { key }
    }

    /// Get the inner GlweSecretKey
    pub fn inner(&self) -> &GlweSecretKeyOwned<u128> {
        &self.key
    }

    pub fn degree(&self) -> usize {
        self.key.polynomial_size().0
    }

    /// One byte per binary coefficient
    pub(crate) fn write_to(&self, out: &mut Vec<u8>) {
        out.extend(self.key.as_ref().iter().map(|c| *c as u8));
    }

    pub(crate) fn read_from(reader: &mut ByteReader<'_>, params: &RlweParams) -> RlweResult<Self> {
        let raw = reader.take(params.poly_degree)?;
        if raw.iter().any(|b| *b > 1) {
            return Err(RlweError::Deserialization(
                "secret key coefficient outside {0, 1}".into(),
            ));
        }

        let coeffs: Vec<u128> = raw.iter().map(|b| *b as u128).collect();
        Ok(Self {
            key: GlweSecretKey::from_container(coeffs, params.polynomial_size()),
        })
    }
}

impl Zeroize for SecretKey {
    fn zeroize(&mut self) {
        self.key.as_mut().zeroize();
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretKey")
            .field("degree", &self.degree())
            .finish_non_exhaustive()
    }
}

/// RLWE public key: a tfhe GLWE encryption of zero, `(a, b = a*s + e)`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    inner: Glwe,
}

impl PublicKey {
    /// Derive a public key for `secret`
    pub fn generate(secret: &SecretKey, params: &RlweParams) -> RlweResult<Self> {
        let mut seeder = new_seeder();
        let seeder_ref = seeder.as_mut();
        let mut encryption_generator =
            EncryptionRandomGenerator::<ActivatedRandomGenerator>::new(seeder_ref.seed(), seeder_ref);

        let mut inner = glwe::zero(params.poly_degree);
        let zeros = PlaintextList::new(0u128, PlaintextCount(params.poly_degree));
        encrypt_glwe_ciphertext(
            secret.inner(),
            &mut inner,
            &zeros,
            params.noise_distribution(),
            &mut encryption_generator,
        );

        Ok(Self { inner })
    }

    /// Mask `a` and body `b`
    pub(crate) fn polynomials(&self) -> (Polynomial<&[u128]>, Polynomial<&[u128]>) {
        glwe::split(&self.inner)
    }

    pub fn degree(&self) -> usize {
        self.inner.polynomial_size().0
    }

    /// Check that decrypting the public key under `secret` leaves a small
    /// error polynomial, i.e. that `secret` is the key it was generated from
    pub fn matches(&self, secret: &SecretKey, params: &RlweParams) -> bool {
        if secret.degree() != self.degree() {
            return false;
        }
        let limit = (params.noise_std * 12.0).ceil() as i128;
        let mut error = PlaintextList::new(0u128, PlaintextCount(self.degree()));
        decrypt_glwe_ciphertext(secret.inner(), &self.inner, &mut error);
        error
            .as_ref()
            .iter()
            .all(|e| glwe::center(*e, MODULUS_BITS).abs() <= limit)
    }

    /// Serialize as `[a: n × u128][b: n × u128]`
    pub(crate) fn write_to(&self, out: &mut Vec<u8>) {
        glwe::write_to(&self.inner, out);
    }

    pub(crate) fn read_from(reader: &mut ByteReader<'_>, params: &RlweParams) -> RlweResult<Self> {
        Ok(Self {
            inner: glwe::read_from(reader, params.poly_degree)?,
        })
    }
}
