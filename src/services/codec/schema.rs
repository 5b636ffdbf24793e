// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::domain::constants::CONTRACT_NAME_MIN_LEN;
use crate::domain::snapshot::{ContractSnapshot, DisplayMetadata, FeatureFlags, TokenSnapshot};
use crate::services::codec::attributes::{Attribute, Attributes};
use alloy::primitives::U256;
use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

/// Optional link field. An empty string and a missing key both mean "not set",
/// but they are kept apart so an update can clear a link explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LinkField {
    #[default]
    Absent,
    Cleared,
    Set(Url),
}

impl LinkField {
    pub fn parse(field: &str, raw: Option<&str>) -> Result<Self, AppError> {
        let Some(raw) = raw else {
            return Ok(LinkField::Absent);
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(LinkField::Cleared);
        }
        Url::parse(trimmed)
            .map(LinkField::Set)
            .map_err(|e| AppError::Validation {
                field: field.to_string(),
                message: format!("must be a URL ({})", e),
            })
    }

    pub fn url(&self) -> Option<&Url> {
        match self {
            LinkField::Set(url) => Some(url),
            _ => None,
        }
    }

    pub fn into_url(self) -> Option<Url> {
        match self {
            LinkField::Set(url) => Some(url),
            _ => None,
        }
    }

    /// Value written to an outbound document; `None` omits the key.
    pub fn encoded(&self) -> Option<String> {
        match self {
            LinkField::Absent => None,
            LinkField::Cleared => Some(String::new()),
            LinkField::Set(url) => Some(url.to_string()),
        }
    }
}

/// A typed record decodable from a metadata document.
pub trait MetadataSchema: Sized {
    const KIND: &'static str;
    const NAME_MIN_LEN: usize = 1;

    fn from_parts(display: DisplayMetadata, attributes: &Attributes) -> Result<Self, AppError>;
}

#[derive(Deserialize)]
struct RawDocument {
    name: Option<String>,
    description: Option<String>,
    image: Option<String>,
    external_url: Option<String>,
    attributes: Option<Vec<Attribute>>,
}

fn validate_name(name: Option<&str>, min_len: usize) -> Result<String, AppError> {
    let name = name.ok_or_else(|| AppError::Validation {
        field: "name".into(),
        message: "is required".into(),
    })?;
    if name.chars().count() < min_len {
        return Err(AppError::Validation {
            field: "name".into(),
            message: format!("must be at least {} chars", min_len),
        });
    }
    Ok(name.to_string())
}

/// Decode and validate `raw` against schema `S`. Every failure, including a
/// missing or mistyped attribute, surfaces as `MalformedMetadata` carrying the
/// raw document.
pub fn decode<S: MetadataSchema>(raw: &Value) -> Result<S, AppError> {
    let malformed = |err: AppError| AppError::MalformedMetadata {
        reason: format!("{} metadata: {}", S::KIND, err),
        payload: raw.to_string(),
    };

    let doc: RawDocument = serde_json::from_value(raw.clone()).map_err(|e| {
        malformed(AppError::Validation {
            field: "document".into(),
            message: e.to_string(),
        })
    })?;

    let display = DisplayMetadata {
        name: validate_name(doc.name.as_deref(), S::NAME_MIN_LEN).map_err(malformed)?,
        description: doc.description,
        image: LinkField::parse("image", doc.image.as_deref())
            .map_err(malformed)?
            .into_url(),
        external_url: LinkField::parse("external_url", doc.external_url.as_deref())
            .map_err(malformed)?
            .into_url(),
    };
    let list = doc.attributes.ok_or_else(|| {
        malformed(AppError::Validation {
            field: "attributes".into(),
            message: "is required".into(),
        })
    })?;
    let attributes = Attributes::from_list(&list);

    S::from_parts(display, &attributes).map_err(malformed)
}

impl MetadataSchema for ContractSnapshot {
    const KIND: &'static str = "contract";
    const NAME_MIN_LEN: usize = CONTRACT_NAME_MIN_LEN;

    fn from_parts(metadata: DisplayMetadata, attrs: &Attributes) -> Result<Self, AppError> {
        Ok(ContractSnapshot {
            metadata,
            token: attrs.as_address("token")?,
            rate: attrs.as_integer("rate")?,
            lock: attrs.as_u64("lock")?,
            epoch_size: attrs.as_u64("epoch_size")?,
            max_supply: attrs.optional_integer("max_supply")?.unwrap_or(U256::ZERO),
            total_supply: attrs.as_integer("total_supply")?,
            owner_contract: attrs.as_address("owner_contract")?,
            owner_id: attrs.as_integer("owner_id")?,
            owner_address: attrs.as_address("owner_address")?,
            claimable: attrs.as_integer("claimable")?,
            total_claimed: attrs.as_integer("total_claimed")?,
            flags: FeatureFlags(attrs.as_u64("flags")?),
        })
    }
}

impl MetadataSchema for TokenSnapshot {
    const KIND: &'static str = "token";

    fn from_parts(metadata: DisplayMetadata, attrs: &Attributes) -> Result<Self, AppError> {
        Ok(TokenSnapshot {
            metadata,
            deposited: attrs.as_integer("deposited")?,
            spent: attrs.as_integer("spent")?,
            unspent: attrs.as_integer("unspent")?,
            withdrawable: attrs.as_integer("withdrawable")?,
            tips: attrs.optional_integer("tips")?.unwrap_or(U256::ZERO),
            active: attrs.as_boolean("active")?,
            expire: attrs.as_u64("expire")?,
        })
    }
}

/// Outbound contract metadata, validated with the same rules used for decoding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContractMetadataDraft {
    pub name: String,
    pub description: Option<String>,
    pub image: LinkField,
    pub external_url: LinkField,
    pub attributes: Attributes,
}

impl ContractMetadataDraft {
    pub fn encode(&self) -> Result<Value, AppError> {
        let name = validate_name(Some(&self.name), CONTRACT_NAME_MIN_LEN)?;

        let mut doc = Map::new();
        doc.insert("name".into(), Value::String(name));
        if let Some(description) = &self.description {
            doc.insert("description".into(), Value::String(description.clone()));
        }
        if let Some(image) = self.image.encoded() {
            doc.insert("image".into(), Value::String(image));
        }
        if let Some(link) = self.external_url.encoded() {
            doc.insert("external_url".into(), Value::String(link));
        }
        let attributes = serde_json::to_value(self.attributes.to_list())
            .map_err(|e| AppError::Unknown(e.into()))?;
        doc.insert("attributes".into(), attributes);
        Ok(Value::Object(doc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::codec::attributes::AttributeValue;
    use alloy::primitives::{Address, address};
    use serde_json::json;

    fn contract_doc() -> Value {
        json!({
            "name": "Tier 1 Sub to Jane",
            "description": "This awesome subscription gives you access to nothing",
            "image": "https://example.com/tier1.png",
            "external_url": "",
            "attributes": [
                {"trait_type": "token", "value": "0x7a250d5630b4cf539739df2c5dacb4c659f2488d"},
                {"trait_type": "rate", "value": 100},
                {"trait_type": "lock", "value": 100},
                {"trait_type": "epoch_size", "value": 3600},
                {"trait_type": "total_supply", "value": 12},
                {"trait_type": "owner_contract", "value": "0x0000000000000000000000000000000000000000"},
                {"trait_type": "owner_id", "value": 1234},
                {"trait_type": "owner_address", "value": "0x0000000000000000000000000000000000000000"},
                {"trait_type": "claimable", "value": "30000"},
                {"trait_type": "total_claimed", "value": 700000},
                {"trait_type": "flags", "value": 5}
            ]
        })
    }

    #[test]
    fn decodes_contract_snapshot() {
        let snapshot: ContractSnapshot = decode(&contract_doc()).unwrap();
        assert_eq!(snapshot.metadata.name, "Tier 1 Sub to Jane");
        assert_eq!(
            snapshot.metadata.image.as_ref().map(Url::as_str),
            Some("https://example.com/tier1.png")
        );
        assert_eq!(snapshot.metadata.external_url, None);
        assert_eq!(
            snapshot.token,
            address!("7a250d5630B4cF539739dF2C5dAcb4c659F2488D")
        );
        assert_eq!(snapshot.rate, U256::from(100u64));
        assert_eq!(snapshot.epoch_size, 3600);
        assert_eq!(snapshot.max_supply, U256::ZERO);
        assert_eq!(snapshot.owner_address, Address::ZERO);
        assert_eq!(snapshot.claimable, U256::from(30_000u64));
        assert!(snapshot.flags.minting_paused());
        assert!(snapshot.flags.tipping_paused());
        assert!(!snapshot.flags.renewal_paused());
    }

    #[test]
    fn unrequested_odd_attribute_does_not_break_decode() {
        let mut doc = contract_doc();
        let list = doc["attributes"].as_array_mut().unwrap();
        list.push(json!({"trait_type": "rating", "value": 4.5}));
        list.push(json!({"trait_type": "notes", "value": null}));
        let snapshot: ContractSnapshot = decode(&doc).unwrap();
        assert_eq!(snapshot.rate, U256::from(100u64));

        let list = doc["attributes"].as_array_mut().unwrap();
        list.retain(|attr| attr["trait_type"] != "rate");
        list.push(json!({"trait_type": "rate", "value": 1.5}));
        assert!(matches!(
            decode::<ContractSnapshot>(&doc),
            Err(AppError::MalformedMetadata { .. })
        ));
    }

    #[test]
    fn missing_required_attribute_is_malformed() {
        let mut doc = contract_doc();
        doc["attributes"]
            .as_array_mut()
            .unwrap()
            .retain(|a| a["trait_type"] != "rate");
        match decode::<ContractSnapshot>(&doc) {
            Err(AppError::MalformedMetadata { reason, payload }) => {
                assert!(reason.contains("rate"), "{reason}");
                assert!(payload.contains("Tier 1 Sub to Jane"));
            }
            other => panic!("expected malformed metadata, got {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_links_short_names_and_non_integers() {
        let mut bad_image = contract_doc();
        bad_image["image"] = json!("not a url");
        let mut short_name = contract_doc();
        short_name["name"] = json!("ab");
        let mut bad_rate = contract_doc();
        bad_rate["attributes"][1]["value"] = json!("fast");
        let mut no_attributes = contract_doc();
        no_attributes.as_object_mut().unwrap().remove("attributes");

        for doc in [bad_image, short_name, bad_rate, no_attributes] {
            assert!(matches!(
                decode::<ContractSnapshot>(&doc),
                Err(AppError::MalformedMetadata { .. })
            ));
        }
    }

    #[test]
    fn decodes_token_snapshot_with_defaults() {
        let doc = json!({
            "name": "Subscription #7",
            "attributes": [
                {"trait_type": "deposited", "value": 1000},
                {"trait_type": "spent", "value": 400},
                {"trait_type": "unspent", "value": 600},
                {"trait_type": "withdrawable", "value": 500},
                {"trait_type": "active", "value": 1},
                {"trait_type": "expire", "value": 1760000000}
            ]
        });
        let token: TokenSnapshot = decode(&doc).unwrap();
        assert_eq!(token.tips, U256::ZERO);
        assert!(token.active);
        assert_eq!(token.expire, 1_760_000_000);
        assert_eq!(token.metadata.description, None);
    }

    #[test]
    fn link_field_distinguishes_cleared_from_absent() {
        assert_eq!(LinkField::parse("image", None).unwrap(), LinkField::Absent);
        assert_eq!(LinkField::parse("image", Some("  ")).unwrap(), LinkField::Cleared);
        assert!(LinkField::parse("image", Some("nope")).is_err());
        assert_eq!(LinkField::Absent.url(), None);
        assert_eq!(LinkField::Cleared.url(), None);
        assert_eq!(LinkField::Absent.encoded(), None);
        assert_eq!(LinkField::Cleared.encoded(), Some(String::new()));
    }

    #[test]
    fn draft_encoding_reuses_decode_rules() {
        let mut attributes = Attributes::default();
        attributes.push("rate", AttributeValue::Integer(U256::from(100u64)));
        let draft = ContractMetadataDraft {
            name: "Tier 2".into(),
            description: None,
            image: LinkField::Cleared,
            external_url: LinkField::parse("external_url", Some("https://example.com")).unwrap(),
            attributes,
        };
        let doc = draft.encode().unwrap();
        assert_eq!(doc["image"], json!(""));
        assert_eq!(doc["external_url"], json!("https://example.com/"));
        assert!(doc.get("description").is_none());
        assert_eq!(doc["attributes"][0]["value"], json!(100));

        let short = ContractMetadataDraft {
            name: "ab".into(),
            ..Default::default()
        };
        assert!(matches!(short.encode(), Err(AppError::Validation { .. })));
    }
}
