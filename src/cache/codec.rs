use bincode::Options;
use serde::{de::DeserializeOwned, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

use crate::constants::{DOCUMENT_SUFFIX, OBJECT_PROTOCOL, OBJECT_SUFFIX, RAW_SUFFIX};
use crate::document::{self, Element};
use crate::utils::CodecError;

/// Turns cached values into entry bytes and back
///
/// Each codec owns a filename suffix, so entries written by different codecs
/// under the same id never collide.
pub trait Codec {
    type Value;

    fn suffix(&self) -> &str;

    /// Codecs whose value already is the entry bytes can lend them
    fn encode<'a>(&self, value: &'a Self::Value) -> Result<Cow<'a, [u8]>, CodecError>;

    fn decode(&self, bytes: &[u8]) -> Result<Self::Value, CodecError>;
}

/// Stores bytes as-is
#[derive(Debug, Clone, Copy, Default)]
pub struct RawCodec;

impl Codec for RawCodec {
    type Value = Vec<u8>;

    fn suffix(&self) -> &str {
        RAW_SUFFIX
    }

    fn encode<'a>(&self, value: &'a Vec<u8>) -> Result<Cow<'a, [u8]>, CodecError> {
        Ok(Cow::Borrowed(value.as_slice()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(bytes.to_vec())
    }
}

/// Stores markup documents in their canonical textual form
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentCodec;

impl Codec for DocumentCodec {
    type Value = Element;

    fn suffix(&self) -> &str {
        DOCUMENT_SUFFIX
    }

    /// Trees that would not parse back to an equal tree are refused
    fn encode<'a>(&self, value: &'a Element) -> Result<Cow<'a, [u8]>, CodecError> {
        value
            .check_canonical()
            .map_err(|e| CodecError::Encode(e.to_string()))?;
        Ok(Cow::Owned(value.to_string().into_bytes()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Element, CodecError> {
        Ok(document::parse(bytes)?)
    }
}

/// Stores any serde value as bincode behind a one-byte protocol tag
pub struct ObjectCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> ObjectCodec<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    fn wire() -> impl Options {
        bincode::DefaultOptions::new()
            .with_fixint_encoding()
            .reject_trailing_bytes()
    }
}

impl<T> Default for ObjectCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ObjectCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ObjectCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectCodec")
            .field("type", &std::any::type_name::<T>())
            .field("protocol", &OBJECT_PROTOCOL)
            .finish()
    }
}

impl<T> Codec for ObjectCodec<T>
where
    T: Serialize + DeserializeOwned,
{
    type Value = T;

    fn suffix(&self) -> &str {
        OBJECT_SUFFIX
    }

    fn encode<'a>(&self, value: &'a T) -> Result<Cow<'a, [u8]>, CodecError> {
        let mut bytes = vec![OBJECT_PROTOCOL];
        Self::wire()
            .serialize_into(&mut bytes, value)
            .map_err(|e| CodecError::Encode(e.to_string()))?;
        Ok(Cow::Owned(bytes))
    }

    fn decode(&self, bytes: &[u8]) -> Result<T, CodecError> {
        let (&protocol, payload) = bytes
            .split_first()
            .ok_or_else(|| CodecError::Decode("empty payload".to_string()))?;
        if protocol != OBJECT_PROTOCOL {
            return Err(CodecError::Protocol {
                expected: OBJECT_PROTOCOL,
                found: protocol,
            });
        }
        Ok(Self::wire().deserialize(payload)?)
    }
}
