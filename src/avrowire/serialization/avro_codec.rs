//! Avro codec with schema-registry wire framing.
//!
//! An [`AvroCodec`] binds one model to one registry subject. The schema id
//! starts unbound; the first encode resolves it through the registry client
//! (one registration observable per codec even under concurrent first use)
//! and caches it for the process lifetime. A failed resolution leaves the
//! codec unbound so the next encode retries.
//!
//! Decoding honors the wire header: when the embedded id differs from the
//! codec's own, the writer's schema is fetched by id and the payload is
//! resolved against the reader's schema, so data written under a different
//! but compatible schema version decodes cleanly.

use std::collections::HashMap;
use std::sync::Arc;

use apache_avro::types::Value as AvroValue;
use apache_avro::{from_avro_datum, to_avro_datum, Decimal as AvroDecimal, Schema as ApacheSchema};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Timelike};
use serde_json::Value;
use tokio::sync::{OnceCell, RwLock};
use uuid::Uuid;

use crate::avrowire::client::{bridge, SchemaRegistryApi};
use crate::avrowire::model::{parser, ModelDescriptor};
use crate::avrowire::schema::{
    AvroSchema, LogicalSchema, RecordSchema, SchemaError, SchemaRegistry,
};

use super::error::SerializationError;
use super::types::FieldValue;
use super::wire;

/// Behavior configuration for a codec instance.
#[derive(Debug, Clone)]
pub struct CodecConfig {
    /// Register the schema on first use. When off, the codec only looks up
    /// an id that callers registered out of band.
    pub auto_register: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            auto_register: true,
        }
    }
}

/// Base contract shared by message codecs.
///
/// The lifecycle surface (`configure`, `fork`, `chain`) is only provided by
/// concrete codecs; the defaults fail with a not-implemented condition so
/// misuse of the abstract surface is a loud programming error rather than a
/// silent fallback.
pub trait MessageCodec: Send + Sync {
    /// The registry subject this codec serves.
    fn subject(&self) -> &str;

    /// Encode a record from synchronous code.
    fn encode_blocking(
        &self,
        record: &HashMap<String, FieldValue>,
    ) -> Result<Vec<u8>, SerializationError>;

    /// Decode a framed message from synchronous code.
    fn decode_blocking(
        &self,
        bytes: &[u8],
    ) -> Result<HashMap<String, FieldValue>, SerializationError>;

    /// Apply string options to this codec.
    fn configure(&mut self, options: &HashMap<String, String>) -> Result<(), SerializationError> {
        if options.is_empty() {
            return Ok(());
        }
        Err(SerializationError::not_implemented("codec options"))
    }

    /// Clone this codec.
    fn fork(&self) -> Result<Box<dyn MessageCodec>, SerializationError> {
        Err(SerializationError::not_implemented("fork"))
    }

    /// Combine this codec with another into a pipeline.
    fn chain(
        &self,
        _other: Box<dyn MessageCodec>,
    ) -> Result<Box<dyn MessageCodec>, SerializationError> {
        Err(SerializationError::not_implemented("chain"))
    }
}

/// Per-model Avro serializer/deserializer bound to a registry subject.
pub struct AvroCodec {
    model_name: String,
    /// The registry session that resolved the model; by-name references in
    /// the schema tree resolve against it.
    registry: SchemaRegistry,
    schema: AvroSchema,
    schema_json: String,
    avro_schema: ApacheSchema,
    subject: String,
    client: Arc<dyn SchemaRegistryApi>,
    config: CodecConfig,
    schema_id: OnceCell<u32>,
    writer_schemas: RwLock<HashMap<u32, ApacheSchema>>,
}

impl AvroCodec {
    /// Build a codec for a model descriptor.
    pub fn new(
        descriptor: ModelDescriptor,
        subject: impl Into<String>,
        client: Arc<dyn SchemaRegistryApi>,
    ) -> Result<Self, SerializationError> {
        let model_name = descriptor.name.clone();
        let mut registry = SchemaRegistry::new();
        let schema = parser::parse_model(&mut registry, descriptor)?;
        let schema_json = schema.to_avro().to_string();
        let avro_schema =
            ApacheSchema::parse_str(&schema_json).map_err(|e| {
                SerializationError::Schema(SchemaError::Validation {
                    message: format!("generated schema rejected: {}", e),
                })
            })?;
        Ok(Self {
            model_name,
            registry,
            schema,
            schema_json,
            avro_schema,
            subject: subject.into(),
            client,
            config: CodecConfig::default(),
            schema_id: OnceCell::new(),
            writer_schemas: RwLock::new(HashMap::new()),
        })
    }

    /// Build a codec for a model type.
    pub fn for_model<T: crate::avrowire::model::AvroModel>(
        subject: impl Into<String>,
        client: Arc<dyn SchemaRegistryApi>,
    ) -> Result<Self, SerializationError> {
        Self::new(T::descriptor(), subject, client)
    }

    pub fn with_config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    /// A codec for another subject with the same schema definition but
    /// independent schema-id state.
    pub fn for_subject(&self, subject: impl Into<String>) -> Self {
        Self {
            model_name: self.model_name.clone(),
            registry: self.registry.clone(),
            schema: self.schema.clone(),
            schema_json: self.schema_json.clone(),
            avro_schema: self.avro_schema.clone(),
            subject: subject.into(),
            client: Arc::clone(&self.client),
            config: self.config.clone(),
            schema_id: OnceCell::new(),
            writer_schemas: RwLock::new(HashMap::new()),
        }
    }

    /// The rendered Avro-JSON this codec registers and encodes with.
    pub fn schema_json(&self) -> &str {
        &self.schema_json
    }

    /// The registry-issued schema id, if already bound.
    pub fn schema_id(&self) -> Option<u32> {
        self.schema_id.get().copied()
    }

    /// Resolve and cache the schema id for this codec's subject.
    ///
    /// Concurrent first-time callers coalesce onto a single in-flight
    /// registration; failure leaves the codec unbound for retry.
    pub async fn resolve_schema_id(&self) -> Result<u32, SerializationError> {
        let id = self
            .schema_id
            .get_or_try_init(|| async {
                let id = if self.config.auto_register {
                    self.client.register(&self.subject, &self.schema_json).await?
                } else {
                    self.client.sync(&self.subject, &self.schema_json).await?
                };
                log::debug!(
                    "bound schema id {} for model {} under subject {}",
                    id,
                    self.model_name,
                    self.subject
                );
                Ok::<u32, SerializationError>(id)
            })
            .await?;
        Ok(*id)
    }

    /// Binary-encode a record and prepend the wire header.
    pub async fn encode(
        &self,
        record: &HashMap<String, FieldValue>,
    ) -> Result<Vec<u8>, SerializationError> {
        let id = self.resolve_schema_id().await?;
        let value = self.record_to_avro(record)?;
        let body = to_avro_datum(&self.avro_schema, value)
            .map_err(|e| SerializationError::EncodingFailed(e.to_string()))?;
        Ok(wire::encode_frame(id, &body))
    }

    /// Validate the wire header and decode the Avro binary body.
    pub async fn decode(
        &self,
        bytes: &[u8],
    ) -> Result<HashMap<String, FieldValue>, SerializationError> {
        let (id, body) = wire::decode_frame(bytes).map_err(|e| match e {
            SerializationError::WireFormat(message) => SerializationError::WireFormat(format!(
                "subject {}: {}",
                self.subject, message
            )),
            other => other,
        })?;

        let mut reader = body;
        let decoded = if self.schema_id.get().copied() == Some(id) {
            from_avro_datum(&self.avro_schema, &mut reader, None)
        } else {
            // Data written under another (compatible) schema version:
            // decode with the writer's schema resolved against ours.
            let writer = self.writer_schema(id).await?;
            from_avro_datum(&writer, &mut reader, Some(&self.avro_schema))
        };
        let avro_value = decoded.map_err(|e| SerializationError::DecodingFailed {
            subject: self.subject.clone(),
            schema_id: Some(id),
            payload_len: bytes.len(),
            message: e.to_string(),
        })?;
        self.avro_to_record(&avro_value)
    }

    async fn writer_schema(&self, id: u32) -> Result<ApacheSchema, SerializationError> {
        {
            let cache = self.writer_schemas.read().await;
            if let Some(schema) = cache.get(&id) {
                return Ok(schema.clone());
            }
        }
        let json = self.client.schema_by_id(id).await?;
        let schema = ApacheSchema::parse_str(&json).map_err(|e| {
            SerializationError::DecodingFailed {
                subject: self.subject.clone(),
                schema_id: Some(id),
                payload_len: 0,
                message: format!("writer schema unparseable: {}", e),
            }
        })?;
        self.writer_schemas.write().await.insert(id, schema.clone());
        Ok(schema)
    }

    // Value conversion, directed by this codec's schema tree. Record fields
    // are encoded in schema order and decoded by name.

    fn record_to_avro(
        &self,
        record: &HashMap<String, FieldValue>,
    ) -> Result<AvroValue, SerializationError> {
        match &self.schema {
            AvroSchema::Record(r) => self.struct_to_avro(r, record),
            _ => Err(SerializationError::UnsupportedType(format!(
                "model {} is not a record",
                self.model_name
            ))),
        }
    }

    fn avro_to_record(
        &self,
        value: &AvroValue,
    ) -> Result<HashMap<String, FieldValue>, SerializationError> {
        match self.from_avro_value(Some(&self.schema), value)? {
            FieldValue::Struct(map) => Ok(map),
            other => Err(SerializationError::DecodingFailed {
                subject: self.subject.clone(),
                schema_id: self.schema_id(),
                payload_len: 0,
                message: format!("expected record, decoded {}", other.type_name()),
            }),
        }
    }

    fn resolve<'a>(&'a self, node: &'a AvroSchema) -> Result<&'a AvroSchema, SerializationError> {
        match node {
            AvroSchema::Ref(name) => Ok(self.registry.get(name)?),
            other => Ok(other),
        }
    }

    fn struct_to_avro(
        &self,
        record: &RecordSchema,
        map: &HashMap<String, FieldValue>,
    ) -> Result<AvroValue, SerializationError> {
        let mut fields = Vec::with_capacity(record.fields.len());
        for field in &record.fields {
            let value = match map.get(&field.name) {
                Some(value) => self.to_avro_value(&field.schema, value)?,
                None => match &field.default {
                    Some(default) => {
                        let fallback = self.default_value(&field.schema, default)?;
                        self.to_avro_value(&field.schema, &fallback)?
                    }
                    None => {
                        return Err(SerializationError::EncodingFailed(format!(
                            "record {} is missing required field {}",
                            record.name, field.name
                        )))
                    }
                },
            };
            fields.push((field.name.clone(), value));
        }
        Ok(AvroValue::Record(fields))
    }

    fn to_avro_value(
        &self,
        node: &AvroSchema,
        value: &FieldValue,
    ) -> Result<AvroValue, SerializationError> {
        let node = self.resolve(node)?;
        match (node, value) {
            (AvroSchema::Null, FieldValue::Null) => Ok(AvroValue::Null),
            (AvroSchema::Boolean, FieldValue::Boolean(b)) => Ok(AvroValue::Boolean(*b)),
            (AvroSchema::Int, FieldValue::Integer(i)) => Ok(AvroValue::Int(*i as i32)),
            (AvroSchema::Long, FieldValue::Integer(i)) => Ok(AvroValue::Long(*i)),
            (AvroSchema::Float, FieldValue::Float(f)) => Ok(AvroValue::Float(*f as f32)),
            (AvroSchema::Double, FieldValue::Float(f)) => Ok(AvroValue::Double(*f)),
            (AvroSchema::Bytes, FieldValue::Bytes(b)) => Ok(AvroValue::Bytes(b.clone())),
            (AvroSchema::String, FieldValue::String(s)) => Ok(AvroValue::String(s.clone())),
            (AvroSchema::Record(r), FieldValue::Struct(map)) => self.struct_to_avro(r, map),
            (AvroSchema::Enum(e), FieldValue::String(symbol)) => {
                let index = e.symbol_index(symbol).ok_or_else(|| {
                    SerializationError::EncodingFailed(format!(
                        "unknown symbol {} for enum {}",
                        symbol, e.name
                    ))
                })?;
                Ok(AvroValue::Enum(index as u32, symbol.clone()))
            }
            (AvroSchema::Array(items), FieldValue::Array(values)) => {
                let converted = values
                    .iter()
                    .map(|v| self.to_avro_value(items, v))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(AvroValue::Array(converted))
            }
            (AvroSchema::Map(values_schema), FieldValue::Map(map)) => {
                let mut avro_map = HashMap::new();
                for (key, item) in map {
                    avro_map.insert(key.clone(), self.to_avro_value(values_schema, item)?);
                }
                Ok(AvroValue::Map(avro_map))
            }
            (AvroSchema::Union(union), value) => {
                let index = union
                    .alternatives
                    .iter()
                    .position(|alt| self.branch_accepts(alt, value))
                    .ok_or_else(|| {
                        SerializationError::EncodingFailed(format!(
                            "no union branch accepts {} value",
                            value.type_name()
                        ))
                    })?;
                let inner = self.to_avro_value(&union.alternatives[index], value)?;
                Ok(AvroValue::Union(index as u32, Box::new(inner)))
            }
            (AvroSchema::Fixed(fixed), FieldValue::Bytes(b)) => {
                if b.len() != fixed.size {
                    return Err(SerializationError::EncodingFailed(format!(
                        "fixed {} expects {} bytes, got {}",
                        fixed.name,
                        fixed.size,
                        b.len()
                    )));
                }
                Ok(AvroValue::Fixed(fixed.size, b.clone()))
            }
            (AvroSchema::Logical(logical), value) => self.logical_to_avro(logical, value),
            (node, value) => Err(SerializationError::UnsupportedType(format!(
                "{} value does not fit {} slot",
                value.type_name(),
                schema_kind(node)
            ))),
        }
    }

    fn logical_to_avro(
        &self,
        logical: &LogicalSchema,
        value: &FieldValue,
    ) -> Result<AvroValue, SerializationError> {
        match (logical.logical_type.as_str(), value) {
            ("decimal", FieldValue::ScaledInteger(unscaled, scale)) => {
                let target = logical.effective_scale();
                let rescaled = rescale(*unscaled, *scale, target)?;
                Ok(AvroValue::Decimal(AvroDecimal::from(minimal_be_bytes(
                    rescaled,
                ))))
            }
            ("decimal", FieldValue::Integer(i)) => {
                let rescaled = rescale(*i, 0, logical.effective_scale())?;
                Ok(AvroValue::Decimal(AvroDecimal::from(minimal_be_bytes(
                    rescaled,
                ))))
            }
            ("date", FieldValue::Date(date)) => {
                let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
                Ok(AvroValue::Date(
                    date.signed_duration_since(epoch).num_days() as i32
                ))
            }
            ("date", FieldValue::Integer(days)) => Ok(AvroValue::Date(*days as i32)),
            ("time-millis", FieldValue::Time(time)) => Ok(AvroValue::TimeMillis(
                (time.num_seconds_from_midnight() * 1_000 + time.nanosecond() / 1_000_000) as i32,
            )),
            ("time-millis", FieldValue::Integer(ms)) => Ok(AvroValue::TimeMillis(*ms as i32)),
            ("time-micros", FieldValue::Time(time)) => Ok(AvroValue::TimeMicros(
                time.num_seconds_from_midnight() as i64 * 1_000_000
                    + (time.nanosecond() / 1_000) as i64,
            )),
            ("time-micros", FieldValue::Integer(us)) => Ok(AvroValue::TimeMicros(*us)),
            ("timestamp-millis", FieldValue::Timestamp(ts)) => {
                Ok(AvroValue::TimestampMillis(ts.and_utc().timestamp_millis()))
            }
            ("timestamp-millis", FieldValue::Integer(ms)) => Ok(AvroValue::TimestampMillis(*ms)),
            ("timestamp-micros", FieldValue::Timestamp(ts)) => {
                Ok(AvroValue::TimestampMicros(ts.and_utc().timestamp_micros()))
            }
            ("timestamp-micros", FieldValue::Integer(us)) => Ok(AvroValue::TimestampMicros(*us)),
            ("uuid", FieldValue::String(s)) => {
                let parsed = Uuid::parse_str(s).map_err(|e| {
                    SerializationError::EncodingFailed(format!("invalid uuid {}: {}", s, e))
                })?;
                Ok(AvroValue::Uuid(parsed))
            }
            // Unrecognized logical names encode as the physical base type.
            (_, value) => self.to_avro_value(&logical.base, value),
        }
    }

    /// Whether a union branch accepts the given value.
    fn branch_accepts(&self, node: &AvroSchema, value: &FieldValue) -> bool {
        let node = match self.resolve(node) {
            Ok(node) => node,
            Err(_) => return false,
        };
        match (node, value) {
            (AvroSchema::Null, FieldValue::Null) => true,
            (AvroSchema::Boolean, FieldValue::Boolean(_)) => true,
            (AvroSchema::Int | AvroSchema::Long, FieldValue::Integer(_)) => true,
            (AvroSchema::Float | AvroSchema::Double, FieldValue::Float(_)) => true,
            (AvroSchema::Bytes, FieldValue::Bytes(_)) => true,
            (AvroSchema::Fixed(fixed), FieldValue::Bytes(b)) => b.len() == fixed.size,
            (AvroSchema::String, FieldValue::String(_)) => true,
            (AvroSchema::Enum(e), FieldValue::String(symbol)) => e.symbol_index(symbol).is_some(),
            // A record branch matches when the struct covers its required
            // fields and brings no unknown ones.
            (AvroSchema::Record(r), FieldValue::Struct(map)) => {
                r.fields
                    .iter()
                    .all(|f| f.default.is_some() || map.contains_key(&f.name))
                    && map
                        .keys()
                        .all(|key| r.fields.iter().any(|f| f.name == *key))
            }
            (AvroSchema::Array(_), FieldValue::Array(_)) => true,
            (AvroSchema::Map(_), FieldValue::Map(_)) => true,
            (AvroSchema::Logical(logical), value) => match logical.logical_type.as_str() {
                "decimal" => matches!(
                    value,
                    FieldValue::ScaledInteger(_, _) | FieldValue::Integer(_)
                ),
                "date" => matches!(value, FieldValue::Date(_) | FieldValue::Integer(_)),
                "time-millis" | "time-micros" => {
                    matches!(value, FieldValue::Time(_) | FieldValue::Integer(_))
                }
                "timestamp-millis" | "timestamp-micros" => {
                    matches!(value, FieldValue::Timestamp(_) | FieldValue::Integer(_))
                }
                "uuid" => matches!(value, FieldValue::String(_)),
                _ => self.branch_accepts(&logical.base, value),
            },
            _ => false,
        }
    }

    /// Materialize a declared JSON default as a field value.
    fn default_value(
        &self,
        node: &AvroSchema,
        default: &Value,
    ) -> Result<FieldValue, SerializationError> {
        let node = self.resolve(node)?;
        match default {
            Value::Null => Ok(FieldValue::Null),
            Value::Bool(b) => Ok(FieldValue::Boolean(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(FieldValue::Integer(i))
                } else {
                    Ok(FieldValue::Float(n.as_f64().unwrap_or(0.0)))
                }
            }
            Value::String(s) => Ok(FieldValue::String(s.clone())),
            Value::Array(items) => {
                let element_node = match node {
                    AvroSchema::Array(items_schema) => items_schema.as_ref(),
                    other => other,
                };
                let converted = items
                    .iter()
                    .map(|item| self.default_value(element_node, item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(FieldValue::Array(converted))
            }
            Value::Object(map) => {
                let mut converted = HashMap::new();
                for (key, item) in map {
                    converted.insert(key.clone(), self.default_value(node, item)?);
                }
                match node {
                    AvroSchema::Record(_) => Ok(FieldValue::Struct(converted)),
                    _ => Ok(FieldValue::Map(converted)),
                }
            }
        }
    }

    fn from_avro_value(
        &self,
        node: Option<&AvroSchema>,
        value: &AvroValue,
    ) -> Result<FieldValue, SerializationError> {
        let node = match node {
            Some(n) => self.resolve(n).ok(),
            None => None,
        };
        match value {
            AvroValue::Null => Ok(FieldValue::Null),
            AvroValue::Boolean(b) => Ok(FieldValue::Boolean(*b)),
            AvroValue::Int(i) => Ok(FieldValue::Integer(*i as i64)),
            AvroValue::Long(l) => Ok(FieldValue::Integer(*l)),
            AvroValue::Float(f) => Ok(FieldValue::Float(*f as f64)),
            AvroValue::Double(d) => Ok(FieldValue::Float(*d)),
            AvroValue::Bytes(b) => Ok(FieldValue::Bytes(b.clone())),
            AvroValue::String(s) => Ok(FieldValue::String(s.clone())),
            AvroValue::Fixed(_, b) => Ok(FieldValue::Bytes(b.clone())),
            AvroValue::Enum(_, symbol) => Ok(FieldValue::String(symbol.clone())),
            AvroValue::Union(index, inner) => {
                let branch = match node {
                    Some(AvroSchema::Union(u)) => u.alternatives.get(*index as usize),
                    _ => None,
                };
                self.from_avro_value(branch, inner)
            }
            AvroValue::Record(avro_fields) => {
                let record = match node {
                    Some(AvroSchema::Record(r)) => Some(r),
                    _ => None,
                };
                let mut map = HashMap::new();
                for (name, item) in avro_fields {
                    let field_node = record
                        .and_then(|r| r.fields.iter().find(|f| f.name == *name))
                        .map(|f| &f.schema);
                    map.insert(name.clone(), self.from_avro_value(field_node, item)?);
                }
                Ok(FieldValue::Struct(map))
            }
            AvroValue::Array(items) => {
                let element_node = match node {
                    Some(AvroSchema::Array(items_schema)) => Some(items_schema.as_ref()),
                    _ => None,
                };
                let converted = items
                    .iter()
                    .map(|item| self.from_avro_value(element_node, item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(FieldValue::Array(converted))
            }
            AvroValue::Map(avro_map) => {
                let value_node = match node {
                    Some(AvroSchema::Map(values_schema)) => Some(values_schema.as_ref()),
                    _ => None,
                };
                let mut map = HashMap::new();
                for (key, item) in avro_map {
                    map.insert(key.clone(), self.from_avro_value(value_node, item)?);
                }
                Ok(FieldValue::Map(map))
            }
            AvroValue::Date(days) => {
                let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
                match epoch.checked_add_signed(Duration::days(*days as i64)) {
                    Some(date) => Ok(FieldValue::Date(date)),
                    None => Ok(FieldValue::Integer(*days as i64)),
                }
            }
            AvroValue::TimeMillis(ms) => {
                let seconds = (*ms / 1_000) as u32;
                let nanos = (*ms % 1_000) as u32 * 1_000_000;
                match NaiveTime::from_num_seconds_from_midnight_opt(seconds, nanos) {
                    Some(time) => Ok(FieldValue::Time(time)),
                    None => Ok(FieldValue::Integer(*ms as i64)),
                }
            }
            AvroValue::TimeMicros(us) => {
                let seconds = (*us / 1_000_000) as u32;
                let nanos = (*us % 1_000_000) as u32 * 1_000;
                match NaiveTime::from_num_seconds_from_midnight_opt(seconds, nanos) {
                    Some(time) => Ok(FieldValue::Time(time)),
                    None => Ok(FieldValue::Integer(*us)),
                }
            }
            AvroValue::TimestampMillis(ms) => {
                let seconds = ms.div_euclid(1_000);
                let nanos = ms.rem_euclid(1_000) as u32 * 1_000_000;
                match DateTime::from_timestamp(seconds, nanos) {
                    Some(ts) => Ok(FieldValue::Timestamp(ts.naive_utc())),
                    None => Ok(FieldValue::Integer(*ms)),
                }
            }
            AvroValue::TimestampMicros(us) => {
                let seconds = us.div_euclid(1_000_000);
                let nanos = us.rem_euclid(1_000_000) as u32 * 1_000;
                match DateTime::from_timestamp(seconds, nanos) {
                    Some(ts) => Ok(FieldValue::Timestamp(ts.naive_utc())),
                    None => Ok(FieldValue::Integer(*us)),
                }
            }
            AvroValue::Decimal(decimal) => {
                let bytes: Vec<u8> = decimal.try_into().map_err(|e| {
                    SerializationError::UnsupportedType(format!(
                        "decimal bytes unavailable: {:?}",
                        e
                    ))
                })?;
                let unscaled = be_bytes_to_i64(&bytes)?;
                let scale = match node {
                    Some(AvroSchema::Logical(logical)) => logical.effective_scale(),
                    _ => 0,
                };
                Ok(FieldValue::ScaledInteger(unscaled, scale))
            }
            AvroValue::Uuid(uuid) => Ok(FieldValue::String(uuid.to_string())),
            AvroValue::Duration(duration) => {
                Ok(FieldValue::Bytes(<[u8; 12]>::from(*duration).to_vec()))
            }
            other => Err(SerializationError::UnsupportedType(format!(
                "unsupported avro value {:?}",
                other
            ))),
        }
    }
}

impl MessageCodec for AvroCodec {
    fn subject(&self) -> &str {
        &self.subject
    }

    fn encode_blocking(
        &self,
        record: &HashMap<String, FieldValue>,
    ) -> Result<Vec<u8>, SerializationError> {
        bridge::block_on(self.encode(record))
    }

    fn decode_blocking(
        &self,
        bytes: &[u8],
    ) -> Result<HashMap<String, FieldValue>, SerializationError> {
        bridge::block_on(self.decode(bytes))
    }

    fn configure(&mut self, options: &HashMap<String, String>) -> Result<(), SerializationError> {
        for (key, raw) in options {
            match key.as_str() {
                "auto.register.schemas" => {
                    self.config.auto_register = raw.parse().map_err(|_| {
                        SerializationError::EncodingFailed(format!(
                            "invalid boolean for {}: {}",
                            key, raw
                        ))
                    })?;
                }
                unknown => {
                    return Err(SerializationError::not_implemented(&format!(
                        "codec option {}",
                        unknown
                    )))
                }
            }
        }
        Ok(())
    }
}

/// Key/value codec pair for one topic, using the registry's
/// `<topic>-key` / `<topic>-value` subject convention.
pub struct TopicSerde {
    topic: String,
    client: Arc<dyn SchemaRegistryApi>,
    key: Option<AvroCodec>,
    value: AvroCodec,
}

impl TopicSerde {
    pub fn new(
        topic: impl Into<String>,
        value_model: ModelDescriptor,
        client: Arc<dyn SchemaRegistryApi>,
    ) -> Result<Self, SerializationError> {
        let topic = topic.into();
        let value = AvroCodec::new(value_model, format!("{}-value", topic), Arc::clone(&client))?;
        Ok(Self {
            topic,
            client,
            key: None,
            value,
        })
    }

    /// Attach a key model; keys are optional for keyless topics.
    pub fn with_key(mut self, key_model: ModelDescriptor) -> Result<Self, SerializationError> {
        let subject = format!("{}-key", self.topic);
        self.key = Some(AvroCodec::new(key_model, subject, Arc::clone(&self.client))?);
        Ok(self)
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn key_codec(&self) -> Option<&AvroCodec> {
        self.key.as_ref()
    }

    pub fn value_codec(&self) -> &AvroCodec {
        &self.value
    }

    pub async fn encode_key(
        &self,
        record: &HashMap<String, FieldValue>,
    ) -> Result<Vec<u8>, SerializationError> {
        self.key_codec_or_err()?.encode(record).await
    }

    pub async fn decode_key(
        &self,
        bytes: &[u8],
    ) -> Result<HashMap<String, FieldValue>, SerializationError> {
        self.key_codec_or_err()?.decode(bytes).await
    }

    pub async fn encode_value(
        &self,
        record: &HashMap<String, FieldValue>,
    ) -> Result<Vec<u8>, SerializationError> {
        self.value.encode(record).await
    }

    pub async fn decode_value(
        &self,
        bytes: &[u8],
    ) -> Result<HashMap<String, FieldValue>, SerializationError> {
        self.value.decode(bytes).await
    }

    fn key_codec_or_err(&self) -> Result<&AvroCodec, SerializationError> {
        self.key.as_ref().ok_or_else(|| {
            SerializationError::not_implemented(&format!("key codec for topic {}", self.topic))
        })
    }
}

fn schema_kind(node: &AvroSchema) -> &'static str {
    match node {
        AvroSchema::Null => "null",
        AvroSchema::Boolean => "boolean",
        AvroSchema::Int => "int",
        AvroSchema::Long => "long",
        AvroSchema::Float => "float",
        AvroSchema::Double => "double",
        AvroSchema::Bytes => "bytes",
        AvroSchema::String => "string",
        AvroSchema::Record(_) => "record",
        AvroSchema::Enum(_) => "enum",
        AvroSchema::Array(_) => "array",
        AvroSchema::Map(_) => "map",
        AvroSchema::Union(_) => "union",
        AvroSchema::Fixed(_) => "fixed",
        AvroSchema::Logical(_) => "logical",
        AvroSchema::Ref(_) => "reference",
    }
}

/// Scale an unscaled decimal value to the schema's scale.
fn rescale(unscaled: i64, from: u32, to: u32) -> Result<i64, SerializationError> {
    if from == to {
        return Ok(unscaled);
    }
    if from < to {
        let factor = 10_i64
            .checked_pow(to - from)
            .ok_or_else(|| SerializationError::EncodingFailed("decimal scale overflow".into()))?;
        unscaled
            .checked_mul(factor)
            .ok_or_else(|| SerializationError::EncodingFailed("decimal value overflow".into()))
    } else {
        Err(SerializationError::EncodingFailed(format!(
            "value scale {} exceeds schema scale {}",
            from, to
        )))
    }
}

/// Big-endian two's complement with redundant leading bytes trimmed.
fn minimal_be_bytes(value: i64) -> Vec<u8> {
    let mut bytes = value.to_be_bytes().to_vec();
    if value >= 0 {
        while bytes.len() > 1 && bytes[0] == 0 && (bytes[1] & 0x80) == 0 {
            bytes.remove(0);
        }
    } else {
        while bytes.len() > 1 && bytes[0] == 0xFF && (bytes[1] & 0x80) != 0 {
            bytes.remove(0);
        }
    }
    bytes
}

/// Sign-extending inverse of [`minimal_be_bytes`].
fn be_bytes_to_i64(bytes: &[u8]) -> Result<i64, SerializationError> {
    if bytes.len() > 8 {
        return Err(SerializationError::UnsupportedType(format!(
            "decimal of {} bytes exceeds 64-bit range",
            bytes.len()
        )));
    }
    let fill = if bytes.first().is_some_and(|b| b & 0x80 != 0) {
        0xFF
    } else {
        0x00
    };
    let mut buf = [fill; 8];
    buf[8 - bytes.len()..].copy_from_slice(bytes);
    Ok(i64::from_be_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_be_bytes_roundtrip() {
        for value in [0, 1, -1, 127, 128, -128, -129, 1234567, -1234567, i64::MAX, i64::MIN] {
            let bytes = minimal_be_bytes(value);
            assert_eq!(be_bytes_to_i64(&bytes).unwrap(), value, "value {}", value);
        }
    }

    #[test]
    fn test_rescale() {
        assert_eq!(rescale(5, 0, 2).unwrap(), 500);
        assert_eq!(rescale(123, 2, 2).unwrap(), 123);
        assert!(rescale(123, 3, 2).is_err());
    }
}
