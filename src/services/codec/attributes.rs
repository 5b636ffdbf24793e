// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::common::parsing::{checksum, is_address_shaped, parse_address_hex, parse_u256_dec};
use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One `{trait_type, value}` pair as it appears in a metadata document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub trait_type: String,
    pub value: Value,
}

impl Attribute {
    pub fn new(trait_type: &str, value: impl Into<Value>) -> Self {
        Self {
            trait_type: trait_type.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    String(String),
    Integer(U256),
    Address(Address),
    Boolean(bool),
    /// Kept as found (negative, fractional, null, nested); no getter accepts it.
    Unsupported(Value),
}

impl AttributeValue {
    fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) => match parse_address_hex(s) {
                Some(address) if is_address_shaped(s.trim()) => AttributeValue::Address(address),
                _ => AttributeValue::String(s.clone()),
            },
            Value::Number(n) => n
                .as_u64()
                .map(|v| AttributeValue::Integer(U256::from(v)))
                .or_else(|| parse_u256_dec(&n.to_string()).map(AttributeValue::Integer))
                .unwrap_or_else(|| AttributeValue::Unsupported(value.clone())),
            Value::Bool(b) => AttributeValue::Boolean(*b),
            _ => AttributeValue::Unsupported(value.clone()),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            AttributeValue::String(s) => Value::String(s.clone()),
            // Large amounts exceed JSON's safe integer range; emit them as strings.
            AttributeValue::Integer(v) => match u64::try_from(*v) {
                Ok(small) if small <= (1u64 << 53) => Value::from(small),
                _ => Value::String(v.to_string()),
            },
            AttributeValue::Address(a) => Value::String(checksum(a)),
            AttributeValue::Boolean(b) => Value::Bool(*b),
            AttributeValue::Unsupported(raw) => raw.clone(),
        }
    }
}

fn mismatch(name: &str, expected: &'static str) -> AppError {
    AppError::AttributeTypeMismatch {
        name: name.to_string(),
        expected,
    }
}

/// Typed view over an attribute list. The first occurrence of a trait name is
/// authoritative; later duplicates are ignored. Values are coerced per getter,
/// so an odd attribute only fails the caller that asks for it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    entries: Vec<(String, AttributeValue)>,
}

impl Attributes {
    pub fn from_list(list: &[Attribute]) -> Self {
        let mut attributes = Attributes::default();
        for attr in list {
            if attributes.get(&attr.trait_type).is_some() {
                tracing::debug!(
                    target: "codec",
                    name = %attr.trait_type,
                    "Ignoring duplicate attribute"
                );
                continue;
            }
            let value = AttributeValue::from_json(&attr.value);
            attributes.entries.push((attr.trait_type.clone(), value));
        }
        attributes
    }

    pub fn to_list(&self) -> Vec<Attribute> {
        self.entries
            .iter()
            .map(|(name, value)| Attribute::new(name, value.to_json()))
            .collect()
    }

    /// Inserts unless `name` is already present, keeping first-wins semantics.
    pub fn push(&mut self, name: &str, value: AttributeValue) -> &mut Self {
        if self.get(name).is_none() {
            self.entries.push((name.to_string(), value));
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    fn require(&self, name: &str) -> Result<&AttributeValue, AppError> {
        self.get(name)
            .ok_or_else(|| AppError::AttributeNotFound(name.to_string()))
    }

    pub fn as_integer(&self, name: &str) -> Result<U256, AppError> {
        match self.require(name)? {
            AttributeValue::Integer(v) => Ok(*v),
            AttributeValue::String(s) => {
                parse_u256_dec(s).ok_or_else(|| mismatch(name, "integer"))
            }
            _ => Err(mismatch(name, "integer")),
        }
    }

    pub fn as_u64(&self, name: &str) -> Result<u64, AppError> {
        let value = self.as_integer(name)?;
        u64::try_from(value).map_err(|_| mismatch(name, "u64"))
    }

    pub fn as_address(&self, name: &str) -> Result<Address, AppError> {
        match self.require(name)? {
            AttributeValue::Address(a) => Ok(*a),
            _ => Err(mismatch(name, "address")),
        }
    }

    /// `1` is true and `0` is false; any other value is a mismatch.
    pub fn as_boolean(&self, name: &str) -> Result<bool, AppError> {
        match self.require(name)? {
            AttributeValue::Boolean(b) => Ok(*b),
            AttributeValue::Integer(v) if *v == U256::from(1u8) => Ok(true),
            AttributeValue::Integer(v) if v.is_zero() => Ok(false),
            AttributeValue::String(s) if s.trim() == "1" => Ok(true),
            AttributeValue::String(s) if s.trim() == "0" => Ok(false),
            _ => Err(mismatch(name, "boolean")),
        }
    }

    pub fn as_string(&self, name: &str) -> Result<String, AppError> {
        match self.require(name)? {
            AttributeValue::String(s) => Ok(s.clone()),
            AttributeValue::Integer(v) => Ok(v.to_string()),
            AttributeValue::Address(a) => Ok(checksum(a)),
            AttributeValue::Boolean(_) | AttributeValue::Unsupported(_) => Err(mismatch(name, "string")),
        }
    }

    /// Absent attributes read as `None`; present ones must still coerce.
    pub fn optional_integer(&self, name: &str) -> Result<Option<U256>, AppError> {
        match self.get(name) {
            None => Ok(None),
            Some(_) => self.as_integer(name).map(Some),
        }
    }
}
