//! Wallet seam between the proof builders and credential storage.
//!
//! The builders only ever read from the wallet; everything they need is
//! behind `ProverWallet`, so storage can live in another process, an
//! enclave or a file without touching the protocol code.

use std::collections::BTreeMap;

use crate::cl::{ClaimInitData, IssuerPublicKey, MasterSecret, SchemaKey};
use crate::errors::prelude::*;

/// Read access to the prover's per-schema credential material. Missing
/// entries are precondition faults and fail with `ItemNotFound`.
pub trait ProverWallet {
    fn get_public_key(&self, schema_key: &SchemaKey) -> AnoncredsResult<&IssuerPublicKey>;

    fn get_master_secret(&self, schema_key: &SchemaKey) -> AnoncredsResult<&MasterSecret>;

    fn get_claim_init_data(&self, schema_key: &SchemaKey) -> AnoncredsResult<&ClaimInitData>;
}

/// Map-backed reference wallet, used by the tests and suitable for demos.
#[derive(Debug, Default)]
pub struct InMemoryWallet {
    public_keys: BTreeMap<SchemaKey, IssuerPublicKey>,
    master_secrets: BTreeMap<SchemaKey, MasterSecret>,
    claim_init_data: BTreeMap<SchemaKey, ClaimInitData>,
}

impl InMemoryWallet {
    pub fn new() -> InMemoryWallet {
        InMemoryWallet::default()
    }

    pub fn store_public_key(&mut self, schema_key: SchemaKey, pk: IssuerPublicKey) {
        self.public_keys.insert(schema_key, pk);
    }

    pub fn store_master_secret(&mut self, schema_key: SchemaKey, ms: MasterSecret) {
        self.master_secrets.insert(schema_key, ms);
    }

    pub fn store_claim_init_data(&mut self, schema_key: SchemaKey, init_data: ClaimInitData) {
        self.claim_init_data.insert(schema_key, init_data);
    }
}

impl ProverWallet for InMemoryWallet {
    fn get_public_key(&self, schema_key: &SchemaKey) -> AnoncredsResult<&IssuerPublicKey> {
        self.public_keys.get(schema_key).ok_or_else(|| {
            AnoncredsError::ItemNotFound(format!(
                "No issuer public key for schema '{}'",
                schema_key
            ))
        })
    }

    fn get_master_secret(&self, schema_key: &SchemaKey) -> AnoncredsResult<&MasterSecret> {
        self.master_secrets.get(schema_key).ok_or_else(|| {
            AnoncredsError::ItemNotFound(format!("No master secret for schema '{}'", schema_key))
        })
    }

    fn get_claim_init_data(&self, schema_key: &SchemaKey) -> AnoncredsResult<&ClaimInitData> {
        self.claim_init_data.get(schema_key).ok_or_else(|| {
            AnoncredsError::ItemNotFound(format!(
                "No claim init data for schema '{}'",
                schema_key
            ))
        })
    }
}
