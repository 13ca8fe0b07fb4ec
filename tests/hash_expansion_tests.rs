mod common;

use bloomy_rs::{
    create_hash, create_hash_str, create_hash_with_encoding,
    default_hash_function, expand,
    hash::{hash_fnv1_32, seed_from_hash},
};
use common::{generate_random_items, seeded_rng};
use std::collections::HashSet;

#[test]
fn test_expansion_is_deterministic_across_calls() {
    let mut rng = seeded_rng(3);
    for item in generate_random_items(&mut rng, 200, 100, &HashSet::new()) {
        let first: Vec<u32> = expand(&item, 9).collect();
        let second: Vec<u32> = expand(&item, 9).collect();
        assert_eq!(first, second);
        assert_eq!(
            default_hash_function(&item, 9, 4099),
            default_hash_function(&item, 9, 4099)
        );
    }
}

#[test]
fn test_reduction_matches_raw_expansion() {
    let raw: Vec<u32> = expand(b"reduce me", 5).collect();
    let reduced = default_hash_function(b"reduce me", 5, 997);
    let expected: Vec<u32> = raw.iter().map(|v| v % 997).collect();
    assert_eq!(reduced, expected);
}

#[test]
fn test_create_hash_is_first_expansion_value() {
    let items: [&[u8]; 4] = [b"", b"a", b"hello world", &[0xFF; 64]];
    for item in items {
        assert_eq!(create_hash(item), expand(item, 1).next().unwrap());
    }
    assert_eq!(create_hash_str("hello world"), create_hash(b"hello world"));
    assert_eq!(
        create_hash_with_encoding("hello world", encoding_rs::WINDOWS_1252),
        create_hash(b"hello world")
    );
}

#[test]
fn test_high_bytes_feed_the_hash() {
    // bytes above 0x7F are xored in as unsigned values
    let expected = 2_166_136_261u32.wrapping_mul(16_777_619) ^ 0xFF;
    assert_eq!(hash_fnv1_32(&[0xFF]), expected);
}

#[test]
fn test_seeds_are_non_negative_31_bit_values() {
    let mut rng = seeded_rng(5);
    for item in generate_random_items(&mut rng, 500, 16, &HashSet::new()) {
        let seed = seed_from_hash(hash_fnv1_32(&item));
        assert!(seed <= i32::MAX as u64);
    }
}
