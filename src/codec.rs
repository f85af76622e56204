//! Conversion between block bodies and features.
//!
//! A body is a protobuf [`proto::Body`]; each entry pairs a well-known-binary
//! geometry with a list of typed tags.

use crate::error::{Error, Result};
use crate::feature::{Feature, Properties};
use crate::geometry::Geometry;
use crate::proto::{self, tag::ValueType};
use crate::value::Value;
use prost::Message;

/// Converts a properties mapping into wire tags, one per entry, in key order.
pub fn encode_tags(properties: &Properties) -> Vec<proto::Tag> {
    properties
        .iter()
        .map(|(key, value)| proto::Tag {
            key: key.clone(),
            value: value.to_tag_bytes(),
            r#type: value.tag_type() as i32,
        })
        .collect()
}

/// Converts wire tags into a properties mapping.
///
/// When a key repeats, the last tag wins. An unknown type code fails with
/// `Error::UnsupportedTagType`; the property is never dropped silently.
pub fn decode_tags(tags: &[proto::Tag]) -> Result<Properties> {
    let mut properties = Properties::new();
    for tag in tags {
        let value_type =
            ValueType::try_from(tag.r#type).map_err(|_| Error::UnsupportedTagType {
                key: tag.key.clone(),
                code: tag.r#type,
            })?;
        let value = Value::from_tag_bytes(&tag.key, value_type, &tag.value)?;
        properties.insert(tag.key.clone(), value);
    }
    Ok(properties)
}

/// Serializes a batch of features into one block body.
pub fn encode_body<G: Geometry>(features: &[Feature<G>]) -> Result<Vec<u8>> {
    let feature = features
        .iter()
        .map(|f| {
            Ok(proto::Feature {
                tags: encode_tags(&f.properties),
                geom: f.geometry.to_wkb()?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let body = proto::Body {
        meta: None,
        feature,
    };
    Ok(body.encode_to_vec())
}

/// Parses one block body into its features, preserving their order.
pub fn decode_body<G: Geometry>(bytes: &[u8]) -> Result<Vec<Feature<G>>> {
    let body = proto::Body::decode(bytes)?;
    body.feature
        .iter()
        .map(|f| {
            Ok(Feature {
                geometry: G::from_wkb(&f.geom)?,
                properties: decode_tags(&f.tags)?,
            })
        })
        .collect()
}
