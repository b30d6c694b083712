//! Seeded random wire values for conversion tests.
//!
//! `RandomWire` walks a converter tree and produces raw JSON the
//! converter is guaranteed to accept, shaped so that dumping the
//! coerced value reproduces the input exactly: floats are emitted as
//! JSON floats, timestamps through the same RFC 3339 rendering the
//! engine uses, bytes pre-encoded as base64, null roots confined to
//! nullable fields, optional fields flipped on and off, and the
//! occasional undeclared key thrown in to exercise extra-data
//! carriage. Same seed, same values.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, FixedOffset, SecondsFormat};
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value as JsonValue;

use wirework_convert::{Converter, EnumDescriptor, ModelDescriptor, Scalar, UnionDescriptor};

// -------------------------------------------------------------------------
// RandomWire

/// A deterministic generator of well-formed wire values.
#[derive(Debug)]
pub struct RandomWire {
    rng: StdRng,
}

impl RandomWire {
    pub fn seeded(seed: u64) -> RandomWire {
        RandomWire {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// A raw wire value the converter accepts.
    pub fn value(&mut self, converter: &Converter) -> JsonValue {
        self.gen_value(converter, 3)
    }

    fn gen_value(&mut self, converter: &Converter, depth: usize) -> JsonValue {
        match converter {
            Converter::Unknown => random_json(&mut self.rng, depth),
            Converter::Scalar(scalar) => self.gen_scalar(*scalar),
            Converter::Enum(descriptor) => self.gen_enum(descriptor),
            Converter::List(element) => {
                let len = if depth == 0 { 0 } else { self.rng.gen_range(0..4) };
                JsonValue::Array(
                    (0..len)
                        .map(|_| self.gen_value(element, depth - 1))
                        .collect(),
                )
            }
            Converter::Map(values) => {
                let len = if depth == 0 { 0 } else { self.rng.gen_range(0..4) };
                let mut out = serde_json::Map::new();
                for index in 0..len {
                    let key = format!("k{index}_{}", self.word(4));
                    out.insert(key, self.gen_value(values, depth - 1));
                }
                JsonValue::Object(out)
            }
            Converter::Model(descriptor) => self.gen_model(descriptor, depth),
            Converter::Union(descriptor) => self.gen_union(descriptor, depth),
        }
    }

    fn gen_scalar(&mut self, scalar: Scalar) -> JsonValue {
        match scalar {
            Scalar::Str => JsonValue::String(self.word(8)),
            Scalar::Int => JsonValue::from(self.rng.gen_range(-1_000_000i64..1_000_000)),
            Scalar::Float => {
                JsonValue::from(self.rng.gen_range(-4_000_000i64..4_000_000) as f64 / 100.0)
            }
            Scalar::Bool => JsonValue::Bool(self.rng.gen_bool(0.5)),
            Scalar::Bytes => {
                let len = self.rng.gen_range(0..12);
                let bytes: Vec<u8> = (0..len).map(|_| self.rng.gen()).collect();
                JsonValue::String(STANDARD.encode(bytes))
            }
            Scalar::Timestamp => JsonValue::String(self.timestamp()),
        }
    }

    fn gen_enum(&mut self, descriptor: &EnumDescriptor) -> JsonValue {
        let members: Vec<&str> = descriptor.members().collect();
        // every tenth value is a member the descriptor never declared,
        // exercising pass-through
        if members.is_empty() || self.rng.gen_ratio(1, 10) {
            JsonValue::String(format!("future_{}", self.word(5)))
        } else {
            let pick = self.rng.gen_range(0..members.len());
            JsonValue::String(members[pick].to_string())
        }
    }

    fn gen_model(&mut self, descriptor: &ModelDescriptor, depth: usize) -> JsonValue {
        let mut out = serde_json::Map::new();
        for field in descriptor.fields() {
            let present = !field.optional || field.default.is_some() || self.rng.gen_bool(0.7);
            if !present {
                continue;
            }
            if field.nullable && self.rng.gen_ratio(1, 5) {
                out.insert(field.wire_name.clone(), JsonValue::Null);
                continue;
            }
            let mut value = self.gen_value(&field.converter, depth);
            // an explicit null only survives on a nullable field, so
            // re-roll null roots for everything else
            while value.is_null() && !field.nullable {
                value = self.gen_value(&field.converter, depth);
            }
            out.insert(field.wire_name.clone(), value);
        }
        if self.rng.gen_ratio(1, 4) {
            for index in 0..self.rng.gen_range(1..3) {
                let key = format!("undocumented_{index}_{}", self.word(4));
                if descriptor.field_by_wire(&key).is_none() {
                    out.insert(key, random_json(&mut self.rng, 1));
                }
            }
        }
        JsonValue::Object(out)
    }

    fn gen_union(&mut self, descriptor: &UnionDescriptor, depth: usize) -> JsonValue {
        let variants: Vec<_> = descriptor.variants().collect();
        if variants.is_empty() {
            return JsonValue::Null;
        }
        let pick = self.rng.gen_range(0..variants.len());
        let variant = variants[pick];
        let mut raw = self.gen_value(&variant.converter, depth);
        // a discriminated variant must carry its own tag
        if let (Some(field), Some(tag)) = (descriptor.discriminator(), &variant.tag) {
            if let JsonValue::Object(entries) = &mut raw {
                entries.insert(field.to_string(), JsonValue::String(tag.clone()));
            }
        }
        raw
    }

    fn timestamp(&mut self) -> String {
        let secs = self.rng.gen_range(0..2_000_000_000i64);
        let millis: u32 = [0, 250, 999][self.rng.gen_range(0..3)];
        let offset_secs = [0, 0, 19_800, -28_800][self.rng.gen_range(0..4)];
        let utc = DateTime::from_timestamp(secs, millis * 1_000_000).unwrap_or_default();
        let local = match FixedOffset::east_opt(offset_secs) {
            Some(offset) => utc.with_timezone(&offset),
            None => utc.fixed_offset(),
        };
        local.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }

    fn word(&mut self, len: usize) -> String {
        (&mut self.rng)
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(char::from)
            .collect()
    }
}

/// A random JSON value with no schema at all, for unknown-typed fields
/// and extra data.
pub fn random_json(rng: &mut StdRng, depth: usize) -> JsonValue {
    let ceiling = if depth == 0 { 4 } else { 6 };
    match rng.gen_range(0..ceiling) {
        0 => JsonValue::Null,
        1 => JsonValue::Bool(rng.gen_bool(0.5)),
        2 => JsonValue::from(rng.gen_range(-10_000i64..10_000)),
        3 => {
            let word: String = rng
                .sample_iter(&Alphanumeric)
                .take(6)
                .map(char::from)
                .collect();
            JsonValue::String(word)
        }
        4 => JsonValue::Array(
            (0..rng.gen_range(0..3))
                .map(|_| random_json(rng, depth - 1))
                .collect(),
        ),
        _ => {
            let mut out = serde_json::Map::new();
            for index in 0..rng.gen_range(0..3) {
                out.insert(format!("f{index}"), random_json(rng, depth - 1));
            }
            JsonValue::Object(out)
        }
    }
}
