//! # Organization Profile — Immutable Tenant Snapshot
//!
//! Defines [`OrganizationProfile`], the frozen set of onboarding answers a
//! derivation run evaluates against. The engine only ever borrows a profile;
//! there are no mutators. Re-running a derivation against the same snapshot
//! must therefore consult exactly the same attribute values.
//!
//! ## Attribute model
//!
//! Attributes are either scalar (one string value) or set-valued (a list of
//! strings). Well-known attributes are typed struct fields; anything the
//! catalog team adds later rides in the `custom` map without a schema
//! change. Lookup is case-insensitive on attribute names; value comparison
//! semantics belong to the condition evaluator, not this type.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::canonical::CanonicalBytes;
use crate::digest::{sha256_digest, ContentDigest};
use crate::error::CanonicalizationError;
use crate::identity::TenantId;

/// A borrowed view of one profile attribute's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeRef<'a> {
    /// A single string value.
    Scalar(&'a str),
    /// A set of string values.
    Set(&'a [String]),
}

/// The frozen onboarding answers for one tenant.
///
/// Field absence means the tenant did not provide that answer; the
/// evaluator treats absent attributes as fail-closed (condition not
/// satisfied) rather than erroring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationProfile {
    /// The tenant this snapshot belongs to.
    pub tenant_id: TenantId,

    /// Legal form of the organization (e.g. "private", "government").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_type: Option<String>,

    /// Industry sector (e.g. "Banking", "Healthcare").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,

    /// ISO country code or name of primary operation (e.g. "SA").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// Where workloads run (e.g. "cloud", "on_premise", "hybrid").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosting_model: Option<String>,

    /// Size band (e.g. "small", "medium", "large", "enterprise").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_tier: Option<String>,

    /// Self-assessed compliance maturity (e.g. "initial", "advanced").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maturity_level: Option<String>,

    /// Whether the organization operates critical national infrastructure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_critical_infrastructure: Option<bool>,

    /// Categories of data handled (e.g. "pii", "phi", "cardholder").
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_types: Vec<String>,

    /// Names of material third-party vendors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vendors: Vec<String>,

    /// Tenant-specific answers with no dedicated field. BTreeMap keeps
    /// serialization order deterministic for fingerprinting.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom: BTreeMap<String, String>,
}

impl OrganizationProfile {
    /// Create an empty profile for a tenant. Useful as a test and builder
    /// starting point; a profile with no answers satisfies no conditions.
    pub fn empty(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            organization_type: None,
            sector: None,
            country: None,
            hosting_model: None,
            size_tier: None,
            maturity_level: None,
            is_critical_infrastructure: None,
            data_types: Vec::new(),
            vendors: Vec::new(),
            custom: BTreeMap::new(),
        }
    }

    /// Look up an attribute by name, case-insensitively.
    ///
    /// Returns `None` when the attribute was not provided or the name is
    /// unknown. Both cases read the same to the evaluator: the answer is
    /// absent and conditions over it fail closed.
    pub fn attribute(&self, name: &str) -> Option<AttributeRef<'_>> {
        let key = name.to_ascii_lowercase();
        match key.as_str() {
            "organization_type" => self.organization_type.as_deref().map(AttributeRef::Scalar),
            "sector" => self.sector.as_deref().map(AttributeRef::Scalar),
            "country" => self.country.as_deref().map(AttributeRef::Scalar),
            "hosting_model" => self.hosting_model.as_deref().map(AttributeRef::Scalar),
            "size_tier" => self.size_tier.as_deref().map(AttributeRef::Scalar),
            "maturity_level" => self.maturity_level.as_deref().map(AttributeRef::Scalar),
            "is_critical_infrastructure" => self
                .is_critical_infrastructure
                .map(|b| AttributeRef::Scalar(if b { "true" } else { "false" })),
            "data_types" => {
                if self.data_types.is_empty() {
                    None
                } else {
                    Some(AttributeRef::Set(&self.data_types))
                }
            }
            "vendors" => {
                if self.vendors.is_empty() {
                    None
                } else {
                    Some(AttributeRef::Set(&self.vendors))
                }
            }
            _ => self
                .custom
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(&key))
                .map(|(_, v)| AttributeRef::Scalar(v)),
        }
    }

    /// Content digest of this snapshot, recorded alongside derivation runs
    /// so a stored run can be tied to the exact answers it saw.
    ///
    /// # Errors
    ///
    /// Returns a canonicalization error if serialization fails; profiles
    /// contain no floats, so this does not happen for well-formed values.
    pub fn digest(&self) -> Result<ContentDigest, CanonicalizationError> {
        let cb = CanonicalBytes::new(self)?;
        Ok(sha256_digest(&cb))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn banking_profile() -> OrganizationProfile {
        OrganizationProfile {
            sector: Some("Banking".to_string()),
            country: Some("SA".to_string()),
            size_tier: Some("large".to_string()),
            data_types: vec!["pii".to_string(), "cardholder".to_string()],
            custom: BTreeMap::from([("employee_count".to_string(), "1200".to_string())]),
            ..OrganizationProfile::empty(TenantId::new())
        }
    }

    #[test]
    fn attribute_lookup_scalar() {
        let p = banking_profile();
        assert_eq!(p.attribute("sector"), Some(AttributeRef::Scalar("Banking")));
        assert_eq!(p.attribute("country"), Some(AttributeRef::Scalar("SA")));
    }

    #[test]
    fn attribute_lookup_case_insensitive_name() {
        let p = banking_profile();
        assert_eq!(p.attribute("Sector"), Some(AttributeRef::Scalar("Banking")));
        assert_eq!(p.attribute("SECTOR"), Some(AttributeRef::Scalar("Banking")));
    }

    #[test]
    fn absent_attribute_is_none() {
        let p = banking_profile();
        assert_eq!(p.attribute("hosting_model"), None);
        assert_eq!(p.attribute("maturity_level"), None);
    }

    #[test]
    fn unknown_attribute_is_none() {
        let p = banking_profile();
        assert_eq!(p.attribute("favourite_colour"), None);
    }

    #[test]
    fn set_attribute_lookup() {
        let p = banking_profile();
        match p.attribute("data_types") {
            Some(AttributeRef::Set(values)) => {
                assert_eq!(values, ["pii".to_string(), "cardholder".to_string()]);
            }
            other => panic!("expected set attribute, got {other:?}"),
        }
    }

    #[test]
    fn empty_set_reads_as_absent() {
        let p = OrganizationProfile::empty(TenantId::new());
        assert_eq!(p.attribute("data_types"), None);
        assert_eq!(p.attribute("vendors"), None);
    }

    #[test]
    fn bool_flag_reads_as_scalar() {
        let mut p = OrganizationProfile::empty(TenantId::new());
        assert_eq!(p.attribute("is_critical_infrastructure"), None);
        p.is_critical_infrastructure = Some(true);
        assert_eq!(
            p.attribute("is_critical_infrastructure"),
            Some(AttributeRef::Scalar("true"))
        );
    }

    #[test]
    fn custom_attribute_lookup_case_insensitive() {
        let p = banking_profile();
        assert_eq!(
            p.attribute("employee_count"),
            Some(AttributeRef::Scalar("1200"))
        );
        assert_eq!(
            p.attribute("Employee_Count"),
            Some(AttributeRef::Scalar("1200"))
        );
    }

    #[test]
    fn digest_stable_across_calls() {
        let p = banking_profile();
        assert_eq!(p.digest().unwrap(), p.digest().unwrap());
    }

    #[test]
    fn digest_changes_with_answers() {
        let p = banking_profile();
        let mut q = p.clone();
        q.sector = Some("Healthcare".to_string());
        assert_ne!(p.digest().unwrap(), q.digest().unwrap());
    }

    #[test]
    fn serde_roundtrip_preserves_answers() {
        let p = banking_profile();
        let json = serde_json::to_string(&p).unwrap();
        let back: OrganizationProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }

    #[test]
    fn absent_fields_omitted_from_json() {
        let p = OrganizationProfile::empty(TenantId::new());
        let json = serde_json::to_string(&p).unwrap();
        assert!(!json.contains("sector"));
        assert!(!json.contains("data_types"));
    }
}
