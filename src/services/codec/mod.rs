// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

pub mod attributes;
pub mod schema;

pub use attributes::{Attribute, AttributeValue, Attributes};
pub use schema::{ContractMetadataDraft, LinkField, MetadataSchema, decode};
