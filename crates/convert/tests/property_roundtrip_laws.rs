use std::sync::Arc;

use serde_json::json;
use wirework_convert::{
    defaults, Converter, DescriptorCell, EnumDescriptor, FieldDescriptor, FieldState,
    ModelDescriptor, ModelValue, UnionDescriptor,
};

static STATUS: DescriptorCell<EnumDescriptor> = DescriptorCell::new();
static SUBSCRIPTION: DescriptorCell<ModelDescriptor> = DescriptorCell::new();

fn status() -> Arc<EnumDescriptor> {
    STATUS.get_or_build(|| EnumDescriptor::new("Status", &["active", "canceled"]))
}

fn subscription() -> Arc<ModelDescriptor> {
    SUBSCRIPTION.get_or_build(|| {
        ModelDescriptor::builder("Subscription")
            .field(FieldDescriptor::required("id", Converter::str()))
            .field(FieldDescriptor::required("status", Converter::enum_of(status())))
            .field(FieldDescriptor::required("seats", Converter::int()))
            .field(FieldDescriptor::required("rate", Converter::float()))
            .field(FieldDescriptor::required("live", Converter::bool()))
            .field(FieldDescriptor::required("started_at", Converter::timestamp()).wire("startedAt"))
            .field(FieldDescriptor::optional("coupon", Converter::str()).nullable())
            .field(FieldDescriptor::optional("labels", Converter::list(Converter::str())))
            .field(FieldDescriptor::optional("limits", Converter::map(Converter::int())))
            .field(FieldDescriptor::optional("payload", Converter::bytes()))
            .field(FieldDescriptor::optional("meta", Converter::unknown()))
            .build()
    })
}

#[test]
fn roundtrip_preserves_wire_shape() {
    let raw = json!({
        "id": "sub_9",
        "status": "active",
        "seats": 12,
        "rate": 99.5,
        "live": true,
        "startedAt": "2024-01-15T10:30:00Z",
        "coupon": null,
        "labels": ["b2b", "annual"],
        "limits": {"api": 1000, "webhooks": 50},
        "payload": "aGVsbG8=",
        "meta": {"source": "import", "ids": [1, 2]},
        "undocumented": {"keep": ["me"]}
    });
    let typed = subscription().coerce(raw.clone()).unwrap();
    let dumped = subscription().dump(&typed).unwrap();
    assert_eq!(dumped.wire, raw);
    assert!(dumped.retry_safe);
}

#[test]
fn roundtrip_keeps_absent_fields_absent() {
    let raw = json!({
        "id": "sub_1",
        "status": "active",
        "seats": 1,
        "rate": 5.0,
        "live": false,
        "startedAt": "2023-06-01T00:00:00Z"
    });
    let typed = subscription().coerce(raw.clone()).unwrap();
    let dumped = subscription().dump(&typed).unwrap();
    assert_eq!(dumped.wire, raw);
    let object = dumped.wire.as_object().unwrap();
    assert!(!object.contains_key("coupon"));
    assert!(!object.contains_key("labels"));
}

#[test]
fn omission_law() {
    let mut value = ModelValue::new(subscription());
    value.set("id", "sub_2").unwrap();
    value.set("status", "active").unwrap();
    value.set("seats", 3i64).unwrap();
    value.set("rate", 10.0).unwrap();
    value.set("live", true).unwrap();
    value
        .set("started_at", chrono::DateTime::parse_from_rfc3339("2024-02-01T00:00:00Z").unwrap())
        .unwrap();

    let dumped = subscription().dump(&value).unwrap();
    assert!(!dumped.wire.as_object().unwrap().contains_key("coupon"));
}

#[test]
fn null_vs_absent_law() {
    let mut value = ModelValue::new(subscription());
    value.set("id", "sub_3").unwrap();
    value.set("status", "canceled").unwrap();
    value.set("seats", 3i64).unwrap();
    value.set("rate", 10.0).unwrap();
    value.set("live", true).unwrap();
    value
        .set("started_at", chrono::DateTime::parse_from_rfc3339("2024-02-01T00:00:00Z").unwrap())
        .unwrap();
    value.set_null("coupon").unwrap();

    let dumped = subscription().dump(&value).unwrap();
    let object = dumped.wire.as_object().unwrap();
    assert_eq!(object.get("coupon"), Some(&json!(null)));
}

#[test]
fn enum_forward_compatibility_law() {
    let raw = json!({
        "id": "sub_4",
        "status": "unseen_future_value",
        "seats": 1,
        "rate": 1.0,
        "live": true,
        "startedAt": "2024-02-01T00:00:00Z"
    });
    let typed = subscription().coerce(raw.clone()).unwrap();
    assert_eq!(typed.raw("status").as_str(), Some("unseen_future_value"));
    assert_eq!(subscription().dump(&typed).unwrap().wire, raw);
}

#[test]
fn container_failure_aborts_whole_coercion() {
    let raw = json!({
        "id": "sub_5",
        "status": "active",
        "seats": 1,
        "rate": 1.0,
        "live": true,
        "startedAt": "2024-02-01T00:00:00Z",
        "labels": ["ok", 42, "later"]
    });
    let err = subscription().coerce(raw).unwrap_err();
    assert_eq!(
        err.to_string(),
        "field `labels`: index 1: expected str, got int"
    );
}

#[test]
fn generated_defaults_break_retry_safety_at_any_depth() {
    static ITEM: DescriptorCell<ModelDescriptor> = DescriptorCell::new();
    static ORDER: DescriptorCell<ModelDescriptor> = DescriptorCell::new();
    fn item() -> Arc<ModelDescriptor> {
        ITEM.get_or_build(|| {
            ModelDescriptor::builder("Item")
                .field(FieldDescriptor::required("sku", Converter::str()))
                .field(
                    FieldDescriptor::required("ref", Converter::str())
                        .generated_default(defaults::idempotency_key),
                )
                .build()
        })
    }
    fn order() -> Arc<ModelDescriptor> {
        ORDER.get_or_build(|| {
            ModelDescriptor::builder("Order")
                .field(FieldDescriptor::required("items", Converter::list(Converter::model(item()))))
                .build()
        })
    }

    let typed = order()
        .coerce(json!({"items": [{"sku": "a"}, {"sku": "b"}]}))
        .unwrap();
    let first = order().dump(&typed).unwrap();
    let second = order().dump(&typed).unwrap();
    assert!(!first.retry_safe);
    assert!(!second.retry_safe);
    // each dump mints fresh values
    assert_ne!(
        first.wire["items"][0]["ref"],
        second.wire["items"][0]["ref"]
    );

    // once the caller pins the value, replays are safe
    let raw = json!({"items": [{"sku": "a", "ref": "fixed"}]});
    let pinned = order().coerce(raw.clone()).unwrap();
    let dumped = order().dump(&pinned).unwrap();
    assert!(dumped.retry_safe);
    assert_eq!(dumped.wire, raw);
}

#[test]
fn discriminated_and_probed_unions_round_trip() {
    let per_unit = ModelDescriptor::builder("PerUnit")
        .field(FieldDescriptor::required("kind", Converter::str()))
        .field(FieldDescriptor::required("unit_amount", Converter::int()))
        .build();
    let tiered = ModelDescriptor::builder("Tiered")
        .field(FieldDescriptor::required("kind", Converter::str()))
        .field(FieldDescriptor::required("tiers", Converter::list(Converter::int())))
        .build();
    let pricing = Converter::union(
        UnionDescriptor::builder("Pricing")
            .discriminator("kind")
            .variant("per_unit", Converter::model(per_unit))
            .variant("tiered", Converter::model(tiered))
            .build(),
    );
    for raw in [
        json!({"kind": "per_unit", "unit_amount": 500}),
        json!({"kind": "tiered", "tiers": [100, 80, 60]}),
    ] {
        let typed = pricing.coerce_json(raw.clone()).unwrap();
        assert_eq!(pricing.dump(&typed).unwrap().wire, raw);
    }

    let id_or_list = Converter::union(
        UnionDescriptor::builder("IdOrList")
            .probe(Converter::str())
            .probe(Converter::list(Converter::str()))
            .build(),
    );
    for raw in [json!("one"), json!(["one", "two"])] {
        let typed = id_or_list.coerce_json(raw.clone()).unwrap();
        assert_eq!(id_or_list.dump(&typed).unwrap().wire, raw);
    }
}

#[test]
fn absent_state_survives_round_trip_construction() {
    let typed = subscription()
        .coerce(json!({
            "id": "sub_6",
            "status": "active",
            "seats": 1,
            "rate": 1.0,
            "live": true,
            "startedAt": "2024-02-01T00:00:00Z"
        }))
        .unwrap();
    assert_eq!(typed.state("coupon"), FieldState::Absent);
    assert!(matches!(typed.get("coupon"), Err(_)));
    assert!(typed.raw("coupon").is_null());
}
