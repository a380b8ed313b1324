//! Property-based tests for key derivation.

use a2p_keygen::*;
use proptest::prelude::*;

fn device_id_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9]{8,24}").unwrap()
}

fn is_dashed_hex(key: &str) -> bool {
    let groups: Vec<&str> = key.split('-').collect();
    groups.len() == 4
        && groups.iter().all(|group| {
            group.len() == 4
                && group
                    .chars()
                    .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
        })
}

proptest! {
    #[test]
    fn derivation_is_deterministic(id in device_id_strategy()) {
        prop_assert_eq!(derive(&id).unwrap(), derive(&id).unwrap());
    }

    #[test]
    fn derivation_ignores_case_and_padding(id in device_id_strategy()) {
        let padded = format!("  {}\t", id.to_lowercase());
        prop_assert_eq!(derive(&id.to_uppercase()).unwrap(), derive(&padded).unwrap());
    }

    #[test]
    fn keys_are_four_groups_of_uppercase_hex(id in device_id_strategy()) {
        let key = derive(&id).unwrap().to_string();
        prop_assert!(is_dashed_hex(&key), "unexpected key format: {}", key);
    }

    #[test]
    fn short_ids_are_rejected(id in "[a-zA-Z0-9]{0,7}") {
        let is_invalid = matches!(derive(&id), Err(KeygenError::InvalidDeviceId { .. }));
        prop_assert!(is_invalid);
    }

    #[test]
    fn generated_keys_verify(id in device_id_strategy()) {
        let device = DeviceId::parse(&id).unwrap();
        let key = Generator::default().generate(&device);
        prop_assert_eq!(Status::Valid, Verifier::default().verify(&device, &key.to_string()));
        prop_assert_eq!(
            Status::Valid,
            Verifier::default().verify(&device, &key.serialize::<HexFormat>().to_lowercase())
        );
    }

    #[test]
    fn dashed_form_parses_back(id in device_id_strategy()) {
        let key = derive(&id).unwrap();
        prop_assert_eq!(key, LicenseKey::parse::<DashedHexFormat>(&key.to_string()).unwrap());
    }
}

#[test]
fn single_character_changes_alter_the_key() {
    let base = "1234ABCD5678";
    let original = derive(base).unwrap();
    for index in 0..base.len() {
        for replacement in ['0', '9', 'A', 'Z'] {
            let mut changed: Vec<char> = base.chars().collect();
            if changed[index] == replacement {
                continue;
            }
            changed[index] = replacement;
            let changed: String = changed.into_iter().collect();
            assert_ne!(original, derive(&changed).unwrap(), "collision for {changed}");
        }
    }
}

#[test]
fn known_vector_is_pinned() {
    assert_eq!("8B99-51B8-2928-936B", derive("1234ABCD5678").unwrap().to_string());
}
