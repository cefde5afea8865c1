//! Encryption contexts: parameters plus key material
//!
//! Native binary layout (little-endian):
//!
//! ```text
//! [magic "BSRL"][version u8][kind u8][params 24][pk mask: n × u128][pk body: n × u128][secret: n × u8]?
//! ```
//!
//! `kind` is 0 for a public context and 1 for a secret context; only the
//! latter carries the trailing secret key bytes.

use crate::error::{RlweError, RlweResult};
use crate::keys::{PublicKey, SecretKey};
use crate::params::RlweParams;
use crate::wire::ByteReader;

const MAGIC: &[u8; 4] = b"BSRL";
const VERSION: u8 = 2;
const KIND_PUBLIC: u8 = 0;
const KIND_SECRET: u8 = 1;

/// BLAKE3 fingerprint of parameters and public key
pub type ContextId = [u8; 32];

/// Parameters and public key: enough to encrypt, not to decrypt
#[derive(Clone, Debug)]
pub struct PublicContext {
    params: RlweParams,
    public_key: PublicKey,
    id: ContextId,
}

impl PublicContext {
    fn new(params: RlweParams, public_key: PublicKey) -> Self {
        let id = fingerprint(&params, &public_key);
        Self {
            params,
            public_key,
            id,
        }
    }

    pub fn params(&self) -> &RlweParams {
        &self.params
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn id(&self) -> &ContextId {
        &self.id
    }

    /// Maximum number of values a single ciphertext can pack
    pub fn slot_capacity(&self) -> usize {
        self.params.poly_degree
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        write_header(&mut out, KIND_PUBLIC);
        self.write_body(&mut out);
        out
    }

    /// Parse a public context; secret context bytes are rejected
    pub fn from_bytes(bytes: &[u8]) -> RlweResult<Self> {
        match parse_context(bytes)? {
            ParsedContext::Public(ctx) => Ok(ctx),
            ParsedContext::Secret(_) => Err(RlweError::Deserialization(
                "expected a public context, found secret key material".into(),
            )),
        }
    }

    fn write_body(&self, out: &mut Vec<u8>) {
        self.params.write_to(out);
        self.public_key.write_to(out);
    }

    fn read_body(reader: &mut ByteReader<'_>) -> RlweResult<Self> {
        let params = RlweParams::read_from(reader)?;
        let public_key = PublicKey::read_from(reader, &params)?;
        Ok(Self::new(params, public_key))
    }
}

/// Public context plus the secret key. Never leaves the data owner.
#[derive(Clone)]
pub struct SecretContext {
    public: PublicContext,
    secret_key: SecretKey,
}

impl SecretContext {
    /// Generate fresh keys for `params`
    pub fn generate(params: RlweParams) -> RlweResult<Self> {
        params.validate()?;
        let secret_key = SecretKey::generate(&params);
        let public_key = PublicKey::generate(&secret_key, &params)?;
        Ok(Self {
            public: PublicContext::new(params, public_key),
            secret_key,
        })
    }

    pub fn public(&self) -> &PublicContext {
        &self.public
    }

    pub fn params(&self) -> &RlweParams {
        self.public.params()
    }

    pub fn id(&self) -> &ContextId {
        self.public.id()
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    /// Serialize including the secret key
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        write_header(&mut out, KIND_SECRET);
        self.public.write_body(&mut out);
        self.secret_key.write_to(&mut out);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> RlweResult<Self> {
        match parse_context(bytes)? {
            ParsedContext::Secret(ctx) => Ok(ctx),
            ParsedContext::Public(_) => Err(RlweError::Deserialization(
                "expected a secret context, found public context".into(),
            )),
        }
    }
}

impl std::fmt::Debug for SecretContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretContext")
            .field("public", &self.public)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Result of parsing context bytes of unknown kind
#[derive(Debug)]
pub enum ParsedContext {
    Public(PublicContext),
    Secret(SecretContext),
}

/// Parse either kind of context, validating every byte
pub fn parse_context(bytes: &[u8]) -> RlweResult<ParsedContext> {
    let mut reader = ByteReader::new(bytes);

    let magic: [u8; 4] = reader.array()?;
    if &magic != MAGIC {
        return Err(RlweError::Deserialization("bad context magic".into()));
    }
    let version = reader.u8()?;
    if version != VERSION {
        return Err(RlweError::Deserialization(format!(
            "unsupported context version {version}"
        )));
    }
    let kind = reader.u8()?;
    let public = PublicContext::read_body(&mut reader)?;

    match kind {
        KIND_PUBLIC => {
            reader.finish()?;
            Ok(ParsedContext::Public(public))
        }
        KIND_SECRET => {
            let secret_key = SecretKey::read_from(&mut reader, public.params())?;
            reader.finish()?;
            if !public.public_key().matches(&secret_key, public.params()) {
                return Err(RlweError::Deserialization(
                    "secret key does not match public key".into(),
                ));
            }
            Ok(ParsedContext::Secret(SecretContext { public, secret_key }))
        }
        other => Err(RlweError::Deserialization(format!(
            "unknown context kind {other}"
        ))),
    }
}

fn write_header(out: &mut Vec<u8>, kind: u8) {
    out.extend(MAGIC);
    out.push(VERSION);
    out.push(kind);
}

fn fingerprint(params: &RlweParams, public_key: &PublicKey) -> ContextId {
    let mut body = Vec::new();
    params.write_to(&mut body);
    public_key.write_to(&mut body);

    let mut hasher = blake3::Hasher::new();
    hasher.update(b"blindscore-rlwe context v2");
    hasher.update(&body);
    *hasher.finalize().as_bytes()
}
