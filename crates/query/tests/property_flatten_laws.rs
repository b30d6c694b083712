use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{Map, Value as JsonValue};

use wirework_query::{encode, flatten, QueryError};
use wirework_random::random_json;

const SEEDS: [u64; 4] = [3, 11, 99, 4096];
const CASES: usize = 40;

#[test]
fn property_every_key_roots_in_a_top_level_entry() {
    for seed in SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        for case in 0..CASES {
            let params = random_params(&mut rng);
            let object = params.as_object().unwrap();
            let pairs = flatten(&params).unwrap();
            for (key, _) in &pairs {
                let root = &key[..key.find('[').unwrap_or(key.len())];
                assert!(
                    object.contains_key(root),
                    "key `{key}` has no top-level root (seed {seed} case {case})"
                );
                assert_eq!(
                    key.matches('[').count(),
                    key.matches(']').count(),
                    "unbalanced brackets in `{key}` (seed {seed} case {case})"
                );
            }
        }
    }
}

#[test]
fn property_pair_count_matches_non_null_scalar_leaves() {
    for seed in SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        for case in 0..CASES {
            let params = random_params(&mut rng);
            let pairs = flatten(&params).unwrap();
            assert_eq!(
                pairs.len(),
                scalar_leaves(&params),
                "pair count drifted from leaf count (seed {seed} case {case})"
            );
        }
    }
}

#[test]
fn property_roots_group_in_object_order() {
    for seed in SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        for case in 0..CASES {
            let params = random_params(&mut rng);
            let object = params.as_object().unwrap();
            let pairs = flatten(&params).unwrap();

            let mut seen: Vec<String> = Vec::new();
            for (key, _) in &pairs {
                let root = key[..key.find('[').unwrap_or(key.len())].to_string();
                if seen.last() != Some(&root) {
                    assert!(
                        !seen.contains(&root),
                        "pairs for root `{root}` are not contiguous (seed {seed} case {case})"
                    );
                    seen.push(root);
                }
            }

            let contributing: Vec<String> = object
                .iter()
                .filter(|(_, entry)| scalar_leaves(entry) > 0)
                .map(|(key, _)| key.clone())
                .collect();
            assert_eq!(
                seen, contributing,
                "root order drifted from entry order (seed {seed} case {case})"
            );
        }
    }
}

#[test]
fn property_encoding_round_trips_per_pair() {
    const PALETTE: &[char] = &['a', 'z', '0', '&', '=', '[', ']', ' ', '%', '+', '/', 'é'];

    for seed in SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        for case in 0..CASES {
            let pairs: Vec<(String, String)> = (0..rng.gen_range(0..6))
                .map(|_| (palette_word(&mut rng, PALETTE), palette_word(&mut rng, PALETTE)))
                .collect();
            let encoded = encode(&pairs);

            let mut decoded = Vec::new();
            if !encoded.is_empty() {
                for part in encoded.split('&') {
                    let (key, value) = part
                        .split_once('=')
                        .expect("every encoded pair holds exactly one separator");
                    decoded.push((
                        urlencoding::decode(key).expect("key must decode").into_owned(),
                        urlencoding::decode(value).expect("value must decode").into_owned(),
                    ));
                }
            }
            assert_eq!(
                decoded, pairs,
                "encode lost a pair through the wire (seed {seed} case {case})"
            );
        }
    }
}

#[test]
fn property_non_object_tops_are_rejected() {
    for seed in SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..CASES {
            let value = random_json(&mut rng, 2);
            let result = flatten(&value);
            if value.is_object() {
                assert!(result.is_ok());
            } else {
                let err = result.unwrap_err();
                assert!(matches!(err, QueryError::NotAnObject(_)));
                assert!(err.to_string().starts_with("query parameters must be an object"));
            }
        }
    }
}

fn random_params(rng: &mut StdRng) -> JsonValue {
    let mut entries = Map::new();
    for index in 0..rng.gen_range(1..5) {
        entries.insert(format!("k{index}"), random_json(rng, 2));
    }
    JsonValue::Object(entries)
}

fn scalar_leaves(value: &JsonValue) -> usize {
    match value {
        JsonValue::Null => 0,
        JsonValue::Bool(_) | JsonValue::Number(_) | JsonValue::String(_) => 1,
        JsonValue::Array(items) => items.iter().map(scalar_leaves).sum(),
        JsonValue::Object(entries) => entries.values().map(scalar_leaves).sum(),
    }
}

fn palette_word(rng: &mut StdRng, palette: &[char]) -> String {
    (0..rng.gen_range(0..8))
        .map(|_| palette[rng.gen_range(0..palette.len())])
        .collect()
}
