use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

macro_rules! json_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        ///
        /// Usually a string, but any JSON value the caller supplied is kept
        /// verbatim. Equality is strict: `"5"` and `5` are different ids.
        #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Value);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(Value::String(id.into()))
            }

            /// The id text, when the id is a string.
            pub fn as_str(&self) -> Option<&str> {
                self.0.as_str()
            }

            pub fn as_value(&self) -> &Value {
                &self.0
            }
        }

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                match &self.0 {
                    Value::String(text) => text.hash(state),
                    other => other.to_string().hash(state),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match &self.0 {
                    Value::String(text) => f.write_str(text),
                    other => write!(f, "{other}"),
                }
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self::new(id)
            }
        }

        impl From<Value> for $name {
            fn from(id: Value) -> Self {
                Self(id)
            }
        }
    };
}

json_id! {
    /// Identifier of a player, opaque to the engine beyond equality.
    PlayerId
}

json_id! {
    /// Identifier of a proposal, generated from the step's random stream.
    ProposalId
}

/// JavaScript truthiness of a JSON value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(text) => !text.is_empty(),
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        _ => true,
    }
}

/// Deserializes a field that is present in the input, keeping an explicit
/// `null` as `Some(Value::Null)`. Pair with `#[serde(default)]` so absence
/// reads as `None`.
pub(crate) fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// UTC instant with millisecond precision.
///
/// Timestamps minted by the engine render as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
/// Parsing accepts any RFC 3339 instant and keeps the original text, so a
/// timestamp read from a snapshot is written back exactly as it arrived.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    instant: DateTime<Utc>,
    text: Option<Box<str>>,
}

impl Timestamp {
    /// Milliseconds since the Unix epoch. Out-of-range values clamp to the epoch.
    pub fn from_millis(millis: i64) -> Self {
        Self::from(DateTime::from_timestamp_millis(millis).unwrap_or_default())
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        Self::from(Utc::now())
    }

    pub fn as_millis(&self) -> i64 {
        self.instant.timestamp_millis()
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.instant
    }

    pub fn parse(text: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(text).map(|dt| Self {
            instant: dt.with_timezone(&Utc),
            text: Some(text.into()),
        })
    }

    /// Millisecond rendering in UTC, regardless of how the value was parsed.
    pub fn to_canonical(&self) -> String {
        self.instant.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(instant: DateTime<Utc>) -> Self {
        Self {
            instant,
            text: None,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.text {
            Some(text) => f.write_str(text),
            None => f.write_str(&self.to_canonical()),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
