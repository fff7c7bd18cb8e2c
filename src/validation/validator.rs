//! Trust chain validation: a pure function of (leaf, CA, policy, time).

use chrono::{DateTime, Utc};
use x509_parser::prelude::X509Certificate;
use x509_parser::x509::X509Version;

use super::policy::ValidationPolicy;
use super::result::{TrustChainResult, ValidationFailure, ValidationPath};
use crate::certificates::LoadedCertificate;

/// Validate `leaf` against `ca` under `policy` at the current time.
pub fn validate(
    leaf: &LoadedCertificate,
    ca: Option<&LoadedCertificate>,
    policy: &ValidationPolicy,
) -> TrustChainResult {
    validate_at(leaf, ca, policy, Utc::now())
}

/// Validate at a fixed instant.
///
/// Order of checks:
/// 1. pinned thumbprint, accepted without looking at the CA
/// 2. no CA: plausibility only (see [`ValidationPath::PlausibilityOnly`])
/// 3. relaxed policy: validity window plus issuer/subject common-name match
/// 4. otherwise: chain build from leaf, through bundled intermediates, to CA
pub fn validate_at(
    leaf: &LoadedCertificate,
    ca: Option<&LoadedCertificate>,
    policy: &ValidationPolicy,
    now: DateTime<Utc>,
) -> TrustChainResult {
    if let Some(pinned) = policy.pinned_thumbprint.as_deref() {
        if leaf.matches_thumbprint(pinned) {
            tracing::debug!(thumbprint = %leaf.thumbprint(), "Client certificate matches pinned thumbprint");
            return TrustChainResult::pass(ValidationPath::PinnedThumbprint);
        }
    }

    let result = match ca {
        None => {
            tracing::warn!(
                subject = %leaf.subject(),
                "CA certificate unavailable; accepting on subject/thumbprint plausibility only"
            );
            plausibility(leaf)
        }
        Some(ca) if policy.relaxed => common_name_match(leaf, ca, now),
        Some(ca) => chain_build(leaf, ca, policy, now),
    };

    tracing::debug!(
        subject = %leaf.subject(),
        path = ?result.path,
        passed = result.passed,
        failures = ?result.failures,
        "Trust chain validation finished"
    );
    result
}

/// Weak fallback when no CA certificate can be loaded. It proves nothing
/// about who issued the leaf and is unsuitable beyond demo deployments.
fn plausibility(leaf: &LoadedCertificate) -> TrustChainResult {
    let failures = if leaf.subject().trim().is_empty() || leaf.thumbprint().is_empty() {
        vec![ValidationFailure::Implausible]
    } else {
        Vec::new()
    };
    TrustChainResult::from_failures(ValidationPath::PlausibilityOnly, failures)
}

fn common_name_match(
    leaf: &LoadedCertificate,
    ca: &LoadedCertificate,
    now: DateTime<Utc>,
) -> TrustChainResult {
    let mut failures = validity_failures(leaf, now);

    let matches = match (leaf.issuer_common_name(), ca.subject_common_name()) {
        (Some(issuer), Some(subject)) => issuer.to_lowercase() == subject.to_lowercase(),
        _ => false,
    };
    if !matches {
        failures.push(ValidationFailure::NameMismatch {
            leaf_issuer: leaf.issuer_common_name().map(str::to_string),
            ca_subject: ca.subject_common_name().map(str::to_string),
        });
    }

    TrustChainResult::from_failures(ValidationPath::CommonNameMatch, failures)
}

/// Walk leaf -> bundled intermediates -> CA. Each hop needs an exact
/// issuer/subject match and a verifying signature; intermediates must also be
/// in their validity window and assert `cA`.
fn chain_build(
    leaf: &LoadedCertificate,
    ca: &LoadedCertificate,
    policy: &ValidationPolicy,
    now: DateTime<Utc>,
) -> TrustChainResult {
    let intermediates = match leaf
        .chain()
        .iter()
        .map(|der| LoadedCertificate::from_der(der.clone()))
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(intermediates) => intermediates,
        Err(e) => return unparseable(e),
    };

    let parsed = leaf.parsed().and_then(|leaf_cert| {
        let ca_cert = ca.parsed()?;
        let pool = intermediates
            .iter()
            .map(LoadedCertificate::parsed)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((leaf_cert, ca_cert, pool))
    });
    let (leaf_cert, ca_cert, pool) = match parsed {
        Ok(parsed) => parsed,
        Err(e) => return unparseable(e),
    };

    let mut failures = validity_failures(leaf, now);

    if !ca.is_valid_at(now) {
        failures.push(ValidationFailure::CaExpired);
    }

    if !is_certificate_authority(&ca_cert) {
        failures.push(ValidationFailure::NotACertificateAuthority);
    }

    let mut used = vec![false; pool.len()];
    let mut current = &leaf_cert;
    loop {
        if current.issuer().as_raw() == ca_cert.subject().as_raw() {
            if current.verify_signature(Some(ca_cert.public_key())).is_err() {
                failures.push(ValidationFailure::SignatureInvalid);
            } else if !policy.allow_unknown_ca {
                // No platform trust store is consulted, so a privately issued
                // root is never a known anchor.
                failures.push(ValidationFailure::UntrustedRoot);
            }
            break;
        }

        let issuer = pool.iter().enumerate().find(|(index, candidate)| {
            !used[*index]
                && candidate.subject().as_raw() == current.issuer().as_raw()
                && current.verify_signature(Some(candidate.public_key())).is_ok()
        });

        let Some((index, intermediate)) = issuer else {
            failures.push(ValidationFailure::UntrustedRoot);
            break;
        };
        used[index] = true;

        let loaded = &intermediates[index];
        if !loaded.is_valid_at(now) {
            failures.push(ValidationFailure::IntermediateExpired { subject: loaded.subject().to_string() });
        }
        if !is_certificate_authority(intermediate) {
            failures.push(ValidationFailure::IntermediateNotACertificateAuthority {
                subject: loaded.subject().to_string(),
            });
        }
        current = intermediate;
    }

    TrustChainResult::from_failures(ValidationPath::ChainBuild, failures)
}

fn unparseable(error: impl std::fmt::Display) -> TrustChainResult {
    TrustChainResult::from_failures(
        ValidationPath::ChainBuild,
        vec![ValidationFailure::Unparseable { detail: error.to_string() }],
    )
}

fn validity_failures(leaf: &LoadedCertificate, now: DateTime<Utc>) -> Vec<ValidationFailure> {
    if now > leaf.not_after() {
        vec![ValidationFailure::Expired { not_after: leaf.not_after() }]
    } else if now < leaf.not_before() {
        vec![ValidationFailure::NotYetValid { not_before: leaf.not_before() }]
    } else {
        Vec::new()
    }
}

/// Version 1 certificates cannot carry basic constraints and are accepted as
/// CAs; later versions must assert `cA`.
fn is_certificate_authority(cert: &X509Certificate<'_>) -> bool {
    match cert.basic_constraints() {
        Ok(Some(constraints)) => constraints.value.ca,
        Ok(None) => cert.version() == X509Version::V1,
        Err(_) => false,
    }
}
