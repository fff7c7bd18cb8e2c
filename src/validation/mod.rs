//! # Trust Chain Validation
//!
//! `validate(leaf, ca, policy)` decides whether a client certificate is
//! acceptable. It never errors: an invalid certificate is a
//! [`TrustChainResult`] with `passed == false` and the reasons listed.

pub mod policy;
pub mod result;
pub mod validator;

pub use policy::{RevocationMode, ValidationPolicy};
pub use result::{TrustChainResult, ValidationFailure, ValidationPath};
pub use validator::{validate, validate_at};

use crate::certificates::LoadedCertificate;

/// A [`ValidationPolicy`] fixed at startup.
#[derive(Debug, Clone, Default)]
pub struct TrustChainValidator {
    policy: ValidationPolicy,
}

impl TrustChainValidator {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    pub fn validate(
        &self,
        leaf: &LoadedCertificate,
        ca: Option<&LoadedCertificate>,
    ) -> TrustChainResult {
        validate(leaf, ca, &self.policy)
    }
}
