// src/engine/wire.rs

//! Serialized task state crossing an execution-context boundary.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::errors::Result;

/// Opaque bytes holding one serialized task.
///
/// Remote placement copies state through this type; the receiving context
/// decodes its own instance, so nothing is shared. Finite `f64` values decode
/// to the same bits they were encoded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wire(Vec<u8>);

impl Wire {
    pub fn encode<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Self(serde_json::to_vec(value)?))
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.0)?)
    }

    pub fn encoded_len(&self) -> usize {
        self.0.len()
    }
}

/// A remotely spawned child, ready to be handed to another context.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// Variant name of the child, for logging.
    pub kind: &'static str,
    pub kernel: Wire,
    /// Snapshot of the spawning parent when the child carries it.
    pub carried_parent: Option<Wire>,
}

/// `#[serde(with = "...")]` adapter for `f64` fields that may leave the
/// finite range.
///
/// JSON has no literal for infinities or NaN, so those are written as the
/// strings `"inf"`, `"-inf"` and `"NaN"`.
pub mod any_f64 {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_str(&value.to_string())
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Ok(value),
            Repr::Text(text) => text
                .parse()
                .map_err(|_| D::Error::custom(format!("invalid float literal {text:?}"))),
        }
    }

    /// Same encoding for the values of a map.
    pub mod values {
        use std::collections::BTreeMap;

        use serde::{Deserialize, Deserializer, Serialize, Serializer};

        #[derive(Serialize, Deserialize)]
        struct Value(#[serde(with = "super")] f64);

        pub fn serialize<K, S>(map: &BTreeMap<K, f64>, serializer: S) -> Result<S::Ok, S::Error>
        where
            K: Serialize,
            S: Serializer,
        {
            serializer.collect_map(map.iter().map(|(key, value)| (key, Value(*value))))
        }

        pub fn deserialize<'de, K, D>(deserializer: D) -> Result<BTreeMap<K, f64>, D::Error>
        where
            K: Deserialize<'de> + Ord,
            D: Deserializer<'de>,
        {
            let map = BTreeMap::<K, Value>::deserialize(deserializer)?;
            Ok(map.into_iter().map(|(key, Value(value))| (key, value)).collect())
        }
    }
}
