use crate::error::{EtlError, Result};
use crate::types::{CoreInfo, EntityKind, LaunchSiteInfo, PayloadInfo, RocketInfo};
use serde_json::{Map, Value};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use tracing::debug;

/// Resolves an entity reference to the attributes the remote source reports
/// for it. Implementations never invent defaults: an unknown id is
/// `NotFound`, a transport failure is `RemoteUnavailable`.
pub trait ReferenceResolver {
    fn resolve(&self, kind: EntityKind, id: &str) -> Result<Attributes>;
}

impl<R: ReferenceResolver + ?Sized> ReferenceResolver for &R {
    fn resolve(&self, kind: EntityKind, id: &str) -> Result<Attributes> {
        (**self).resolve(kind, id)
    }
}

/// Attribute map of one resolved entity, with explicit accessors.
///
/// A key that is missing from the response is always a
/// `MalformedResponse`. The `nullable_*` accessors map an explicit JSON
/// `null` to `None`; the `required_*` accessors reject it.
#[derive(Debug, Clone, PartialEq)]
pub struct Attributes {
    kind: EntityKind,
    id: String,
    values: Map<String, Value>,
}

impl Attributes {
    pub fn new(kind: EntityKind, id: impl Into<String>, values: Map<String, Value>) -> Self {
        Self {
            kind,
            id: id.into(),
            values,
        }
    }

    /// Wraps a decoded response body, which must be a JSON object
    pub fn from_value(kind: EntityKind, id: &str, value: Value) -> Result<Self> {
        match value {
            Value::Object(values) => Ok(Self::new(kind, id, values)),
            other => Err(EtlError::malformed(
                format!("{kind} '{id}'"),
                format!("expected a JSON object, got {}", json_type(&other)),
            )),
        }
    }

    fn malformed(&self, detail: String) -> EtlError {
        EtlError::malformed(format!("{} '{}'", self.kind, self.id), detail)
    }

    fn field(&self, key: &str) -> Result<&Value> {
        self.values
            .get(key)
            .ok_or_else(|| self.malformed(format!("missing attribute '{key}'")))
    }

    fn non_null(&self, key: &str) -> Result<Option<&Value>> {
        match self.field(key)? {
            Value::Null => Ok(None),
            value => Ok(Some(value)),
        }
    }

    fn required(&self, key: &str) -> Result<&Value> {
        self.non_null(key)?
            .ok_or_else(|| self.malformed(format!("attribute '{key}' is null")))
    }

    pub fn required_str(&self, key: &str) -> Result<String> {
        let value = self.required(key)?;
        self.as_string(key, value)
    }

    pub fn required_f64(&self, key: &str) -> Result<f64> {
        let value = self.required(key)?;
        self.as_f64(key, value)
    }

    pub fn required_u32(&self, key: &str) -> Result<u32> {
        let value = self.required(key)?;
        self.as_u32(key, value)
    }

    pub fn nullable_str(&self, key: &str) -> Result<Option<String>> {
        self.non_null(key)?
            .map(|value| self.as_string(key, value))
            .transpose()
    }

    pub fn nullable_f64(&self, key: &str) -> Result<Option<f64>> {
        self.non_null(key)?
            .map(|value| self.as_f64(key, value))
            .transpose()
    }

    pub fn nullable_u32(&self, key: &str) -> Result<Option<u32>> {
        self.non_null(key)?
            .map(|value| self.as_u32(key, value))
            .transpose()
    }

    fn as_string(&self, key: &str, value: &Value) -> Result<String> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.type_mismatch(key, "string", value))
    }

    fn as_f64(&self, key: &str, value: &Value) -> Result<f64> {
        value
            .as_f64()
            .ok_or_else(|| self.type_mismatch(key, "number", value))
    }

    fn as_u32(&self, key: &str, value: &Value) -> Result<u32> {
        value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| self.type_mismatch(key, "unsigned integer", value))
    }

    fn type_mismatch(&self, key: &str, expected: &str, value: &Value) -> EtlError {
        self.malformed(format!(
            "attribute '{key}' should be a {expected}, got {}",
            json_type(value)
        ))
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Typed view over a resolved entity
pub trait ResolvedEntity: Sized {
    const KIND: EntityKind;

    fn from_attributes(attrs: &Attributes) -> Result<Self>;
}

impl ResolvedEntity for RocketInfo {
    const KIND: EntityKind = EntityKind::Rocket;

    fn from_attributes(attrs: &Attributes) -> Result<Self> {
        Ok(Self {
            name: attrs.required_str("name")?,
        })
    }
}

impl ResolvedEntity for LaunchSiteInfo {
    const KIND: EntityKind = EntityKind::Launchpad;

    fn from_attributes(attrs: &Attributes) -> Result<Self> {
        Ok(Self {
            name: attrs.required_str("name")?,
            longitude: attrs.required_f64("longitude")?,
            latitude: attrs.required_f64("latitude")?,
        })
    }
}

impl ResolvedEntity for PayloadInfo {
    const KIND: EntityKind = EntityKind::Payload;

    fn from_attributes(attrs: &Attributes) -> Result<Self> {
        Ok(Self {
            mass_kg: attrs.nullable_f64("mass_kg")?,
            orbit: attrs.nullable_str("orbit")?,
        })
    }
}

impl ResolvedEntity for CoreInfo {
    const KIND: EntityKind = EntityKind::Core;

    fn from_attributes(attrs: &Attributes) -> Result<Self> {
        Ok(Self {
            block: attrs.nullable_u32("block")?,
            reuse_count: attrs.required_u32("reuse_count")?,
            serial: attrs.required_str("serial")?,
        })
    }
}

/// Resolves `id` and reads it as entity `E`
pub fn fetch<E: ResolvedEntity>(resolver: &dyn ReferenceResolver, id: &str) -> Result<E> {
    let attrs = resolver.resolve(E::KIND, id)?;
    E::from_attributes(&attrs)
}

/// Resolve-once-per-id wrapper. Output is identical to the wrapped
/// resolver; only repeated lookups of the same id are served from memory.
pub struct CachingResolver<R> {
    inner: R,
    cache: RefCell<HashMap<(EntityKind, String), Attributes>>,
    hits: Cell<usize>,
}

impl<R: ReferenceResolver> CachingResolver<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
            hits: Cell::new(0),
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.get()
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: ReferenceResolver> ReferenceResolver for CachingResolver<R> {
    fn resolve(&self, kind: EntityKind, id: &str) -> Result<Attributes> {
        let key = (kind, id.to_string());
        if let Some(attrs) = self.cache.borrow().get(&key) {
            self.hits.set(self.hits.get() + 1);
            debug!(%kind, id, "cache hit");
            return Ok(attrs.clone());
        }

        let attrs = self.inner.resolve(kind, id)?;
        self.cache.borrow_mut().insert(key, attrs.clone());
        Ok(attrs)
    }
}
