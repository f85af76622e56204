//! Protobuf messages carried in a block body (serialization mode 0).
//!
//! Hand-written `prost` derives; there is no build script or `.proto` compile
//! step.

/// The payload of one block: a batch of features.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Body {
    /// Block-level metadata. Written empty and not interpreted on read.
    #[prost(message, optional, tag = "1")]
    pub meta: ::core::option::Option<Meta>,
    #[prost(message, repeated, tag = "2")]
    pub feature: ::prost::alloc::vec::Vec<Feature>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Meta {
    #[prost(message, repeated, tag = "1")]
    pub tags: ::prost::alloc::vec::Vec<Tag>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Feature {
    #[prost(message, repeated, tag = "1")]
    pub tags: ::prost::alloc::vec::Vec<Tag>,
    /// Geometry in well-known binary.
    #[prost(bytes = "vec", tag = "3")]
    pub geom: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Tag {
    #[prost(string, tag = "1")]
    pub key: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "2")]
    pub value: ::prost::alloc::vec::Vec<u8>,
    #[prost(enumeration = "tag::ValueType", tag = "3")]
    pub r#type: i32,
}

/// Nested types for [`Tag`].
pub mod tag {
    /// Wire type code of a tag value.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum ValueType {
        String = 0,
        Int = 1,
        Double = 2,
    }
}
