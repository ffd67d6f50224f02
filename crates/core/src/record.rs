//! Identity record and its closed set of mutable fields
//!
//! A [`Record`] is keyed by `passport`, which is immutable once written. The
//! six remaining attributes are addressed by [`RecordField`], an explicit
//! enumeration mapping each field identifier to a typed accessor and mutator.
//! Field names arriving from the outside are resolved through
//! [`RecordField::resolve`], which rejects the key attribute and anything
//! outside the closed set at the boundary.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of the key attribute
pub const KEY_FIELD: &str = "passport";

/// Number of positional arguments carried by a full record
pub const RECORD_ARITY: usize = 7;

/// Identity record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Record {
    /// Passport number, the unique and immutable key
    pub passport: String,
    /// Given name
    pub name: String,
    /// Family name
    pub family_name: String,
    /// City of residence
    pub city: String,
    /// Street address
    pub address: String,
    /// Phone number
    pub phone: String,
    /// Family status
    pub family_status: String,
}

impl Record {
    /// Build a record from positional arguments in field order:
    /// passport, name, family_name, city, address, phone, family_status.
    ///
    /// Fails with `ArgumentCount` unless exactly seven arguments are given.
    pub fn from_args(operation: &str, args: &[String]) -> Result<Self> {
        match args {
            [passport, name, family_name, city, address, phone, family_status] => Ok(Record {
                passport: passport.clone(),
                name: name.clone(),
                family_name: family_name.clone(),
                city: city.clone(),
                address: address.clone(),
                phone: phone.clone(),
                family_status: family_status.clone(),
            }),
            _ => Err(Error::ArgumentCount {
                operation: operation.to_string(),
                expected: RECORD_ARITY,
                actual: args.len(),
            }),
        }
    }

    /// Positional arguments in field order, the inverse of [`Record::from_args`]
    pub fn to_args(&self) -> Vec<String> {
        vec![
            self.passport.clone(),
            self.name.clone(),
            self.family_name.clone(),
            self.city.clone(),
            self.address.clone(),
            self.phone.clone(),
            self.family_status.clone(),
        ]
    }

    /// Read a mutable attribute
    pub fn get(&self, field: RecordField) -> &str {
        match field {
            RecordField::Name => &self.name,
            RecordField::FamilyName => &self.family_name,
            RecordField::City => &self.city,
            RecordField::Address => &self.address,
            RecordField::Phone => &self.phone,
            RecordField::FamilyStatus => &self.family_status,
        }
    }

    /// Overwrite a mutable attribute, leaving every other attribute unchanged
    pub fn set(&mut self, field: RecordField, value: impl Into<String>) {
        let slot = match field {
            RecordField::Name => &mut self.name,
            RecordField::FamilyName => &mut self.family_name,
            RecordField::City => &mut self.city,
            RecordField::Address => &mut self.address,
            RecordField::Phone => &mut self.phone,
            RecordField::FamilyStatus => &mut self.family_status,
        };
        *slot = value.into();
    }

    /// Serialize to the JSON stored on the ledger
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(Error::from)
    }

    /// Deserialize from the JSON stored on the ledger
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(Error::from)
    }
}

/// Mutable attribute of a [`Record`]
///
/// The key attribute is deliberately absent: it cannot be named as an update
/// target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    /// `name`
    Name,
    /// `family_name`
    FamilyName,
    /// `city`
    City,
    /// `address`
    Address,
    /// `phone`
    Phone,
    /// `family_status`
    FamilyStatus,
}

impl RecordField {
    /// Every mutable field, in record order
    pub const ALL: [RecordField; 6] = [
        RecordField::Name,
        RecordField::FamilyName,
        RecordField::City,
        RecordField::Address,
        RecordField::Phone,
        RecordField::FamilyStatus,
    ];

    /// Field identifier as it appears in JSON and in update requests
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordField::Name => "name",
            RecordField::FamilyName => "family_name",
            RecordField::City => "city",
            RecordField::Address => "address",
            RecordField::Phone => "phone",
            RecordField::FamilyStatus => "family_status",
        }
    }

    /// Whether `name` denotes the key attribute
    pub fn is_key(name: &str) -> bool {
        name.eq_ignore_ascii_case(KEY_FIELD)
    }

    /// Resolve an update target.
    ///
    /// Fails with `InvalidField` for the key attribute and for any identifier
    /// outside the closed set.
    pub fn resolve(name: &str) -> Result<Self> {
        if Self::is_key(name) {
            return Err(Error::InvalidField {
                field: name.to_string(),
                reason: "the passport number cannot be changed".to_string(),
            });
        }
        name.parse()
    }
}

impl FromStr for RecordField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        RecordField::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| Error::InvalidField {
                field: s.to_string(),
                reason: "not a mutable record field".to_string(),
            })
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
