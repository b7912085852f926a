use std::collections::BTreeMap;

use serde_json::{Map, Number, Value as Json};
use tracing::warn;

use crate::error::{CodecError, CodecResult};
use crate::storable::Storable;
use crate::value::{FromValue, Value};

/// Reserved JSON key holding a document's discriminator.
pub const TYPE_KEY: &str = "__type";

/// Self-describing field container for one object's recorded state.
///
/// A document pairs a discriminator (the type name recorded when the document
/// was written) with a sorted map of fields. Builders consume and return the
/// document so field lists chain:
///
/// ```
/// use keepsake_codec::Document;
///
/// let doc = Document::new("Person")
///     .set("name", "Ada")
///     .set("age", 36)
///     .set("email", None::<String>);
/// assert_eq!(doc.get::<i64>("age").unwrap(), 36);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    discriminator: String,
    fields: BTreeMap<String, Value>,
}

impl Document {
    /// Create an empty document tagged with `discriminator`.
    pub fn new(discriminator: impl Into<String>) -> Self {
        Self {
            discriminator: discriminator.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Create an empty document tagged with `S`'s current type name.
    pub fn for_type<S: Storable>() -> Self {
        Self::new(S::TYPE_NAME)
    }

    /// The type name recorded when this document was written.
    pub fn discriminator(&self) -> &str {
        &self.discriminator
    }

    // ---- Builders ----

    /// Set a field, replacing any previous value under `key`.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set a nested object.
    pub fn set_object<S: Storable>(self, key: impl Into<String>, value: &S) -> Self {
        self.set(key, value.to_document())
    }

    /// Set a nested object, or null when absent.
    pub fn set_optional_object<S: Storable>(
        self,
        key: impl Into<String>,
        value: Option<&S>,
    ) -> Self {
        self.set(key, value.map(Storable::to_document))
    }

    /// Set an array of nested objects.
    pub fn set_objects<S: Storable>(self, key: impl Into<String>, values: &[S]) -> Self {
        let docs: Vec<Value> = values
            .iter()
            .map(|v| Value::Document(v.to_document()))
            .collect();
        self.set(key, Value::List(docs))
    }

    /// In-place variant of [`Document::set`] for loops and conditionals.
    ///
    /// The discriminator key is reserved; attempts to set it are ignored.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let key = key.into();
        if key == TYPE_KEY {
            warn!(discriminator = %self.discriminator, "ignoring write to reserved key {TYPE_KEY}");
            return self;
        }
        self.fields.insert(key, value.into());
        self
    }

    // ---- Getters ----

    /// Raw value under exactly `key`.
    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// First present value under `key`, then each of `legacy` in order.
    pub fn lookup<'a>(&'a self, key: &'a str, legacy: &[&'a str]) -> Option<(&'a str, &'a Value)> {
        std::iter::once(key)
            .chain(legacy.iter().copied())
            .find_map(|k| self.fields.get(k).map(|v| (k, v)))
    }

    /// Read a required field.
    pub fn get<T: FromValue>(&self, key: &str) -> CodecResult<T> {
        self.get_with_legacy(key, &[])
    }

    /// Read a required field, falling back to `legacy` keys in order.
    ///
    /// The first key whose value converts to `T` wins. If no key is present
    /// the error is [`CodecError::MissingField`]; if some key is present but
    /// none converts, it is [`CodecError::FieldType`].
    pub fn get_with_legacy<T: FromValue>(&self, key: &str, legacy: &[&str]) -> CodecResult<T> {
        let mut present = false;
        for k in std::iter::once(key).chain(legacy.iter().copied()) {
            if let Some(value) = self.fields.get(k) {
                present = true;
                if let Some(v) = T::from_value(value) {
                    return Ok(v);
                }
            }
        }
        if present {
            Err(CodecError::FieldType {
                discriminator: self.discriminator.clone(),
                key: key.to_string(),
                expected: T::EXPECTED,
            })
        } else {
            Err(CodecError::MissingField {
                discriminator: self.discriminator.clone(),
                key: key.to_string(),
            })
        }
    }

    /// Read a required field, substituting `on_fail` when it cannot be read.
    ///
    /// A fallback here means the stored data does not match the type's
    /// schema, so it is reported at `warn` level.
    pub fn get_or<T: FromValue>(&self, key: &str, legacy: &[&str], on_fail: T) -> T {
        match self.get_with_legacy(key, legacy) {
            Ok(v) => v,
            Err(e) => {
                warn!(discriminator = %self.discriminator, key, error = %e, "field unreadable; using fallback");
                on_fail
            }
        }
    }

    /// Read an optional field. Absent, null and unreadable values are `None`.
    ///
    /// A present value that does not convert to `T` is reported at `warn`
    /// level before being treated as absent.
    pub fn get_optional<T: FromValue>(&self, key: &str, legacy: &[&str]) -> Option<T> {
        let mut mismatched = None;
        for k in std::iter::once(key).chain(legacy.iter().copied()) {
            match self.fields.get(k) {
                None => {}
                Some(value) if value.is_null() => {}
                Some(value) => match T::from_value(value) {
                    Some(v) => return Some(v),
                    None => {
                        mismatched.get_or_insert((k, value.kind()));
                    }
                },
            }
        }
        if let Some((found_key, found)) = mismatched {
            warn!(
                discriminator = %self.discriminator,
                key = found_key,
                expected = T::EXPECTED,
                found,
                "optional field unreadable; treating as absent"
            );
        }
        None
    }

    // ---- Introspection ----

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Field keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    // ---- Interchange ----

    /// Render as canonical JSON text (keys sorted, discriminator under
    /// [`TYPE_KEY`]).
    pub fn to_text(&self) -> CodecResult<String> {
        Ok(serde_json::to_string(&self.to_json()?)?)
    }

    /// Parse JSON text produced by [`Document::to_text`].
    pub fn from_text(text: &str) -> CodecResult<Self> {
        let json: Json = serde_json::from_str(text)?;
        Self::from_json(&json)
    }

    /// Convert to a JSON object.
    pub fn to_json(&self) -> CodecResult<Json> {
        let mut map = Map::new();
        map.insert(TYPE_KEY.to_string(), Json::String(self.discriminator.clone()));
        for (key, value) in &self.fields {
            map.insert(key.clone(), value_to_json(key, value)?);
        }
        Ok(Json::Object(map))
    }

    /// Convert from a JSON object carrying a [`TYPE_KEY`] string.
    pub fn from_json(json: &Json) -> CodecResult<Self> {
        let map = json
            .as_object()
            .ok_or_else(|| CodecError::Malformed(format!("expected object, found {json}")))?;
        let discriminator = map
            .get(TYPE_KEY)
            .and_then(Json::as_str)
            .ok_or(CodecError::MissingDiscriminator(TYPE_KEY))?;
        let mut fields = BTreeMap::new();
        for (key, value) in map.iter().filter(|(k, _)| k.as_str() != TYPE_KEY) {
            fields.insert(key.clone(), value_from_json(value)?);
        }
        Ok(Self {
            discriminator: discriminator.to_string(),
            fields,
        })
    }
}

fn value_to_json(key: &str, value: &Value) -> CodecResult<Json> {
    Ok(match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::Number((*i).into()),
        Value::Float(f) => Json::Number(
            Number::from_f64(*f).ok_or_else(|| CodecError::NonFiniteFloat { key: key.to_string() })?,
        ),
        Value::Text(s) => Json::String(s.clone()),
        Value::List(items) => Json::Array(
            items
                .iter()
                .map(|item| value_to_json(key, item))
                .collect::<CodecResult<_>>()?,
        ),
        Value::Document(doc) => doc.to_json()?,
    })
}

fn value_from_json(json: &Json) -> CodecResult<Value> {
    Ok(match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(
                n.as_f64()
                    .ok_or_else(|| CodecError::Malformed(format!("unrepresentable number {n}")))?,
            ),
        },
        Json::String(s) => Value::Text(s.clone()),
        Json::Array(items) => Value::List(
            items
                .iter()
                .map(value_from_json)
                .collect::<CodecResult<_>>()?,
        ),
        Json::Object(_) => Value::Document(Document::from_json(json)?),
    })
}
