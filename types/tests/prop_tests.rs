use proptest::prelude::*;

use dao_types::{AccountId, Timestamp, TokenAmount, ONE_TOKEN};

proptest! {
    /// Display output of an amount parses back to the same amount.
    #[test]
    fn token_amount_display_parses_back(raw in 0u128..u128::MAX / 2) {
        let amount = TokenAmount::new(raw);
        let parsed: TokenAmount = amount.to_string().parse().unwrap();
        prop_assert_eq!(parsed, amount);
    }

    /// Whole-token construction agrees with raw scaling.
    #[test]
    fn from_tokens_matches_raw(whole in 0u128..1_000_000_000_000) {
        prop_assert_eq!(TokenAmount::from_tokens(whole).unwrap().raw(), whole * ONE_TOKEN);
    }

    /// Any 20-byte hex address is a valid account id.
    #[test]
    fn hex_addresses_parse(bytes in prop::array::uniform20(any::<u8>())) {
        let raw: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        let parsed = AccountId::parse(&format!("0x{raw}"));
        prop_assert!(parsed.is_ok());
    }

    /// Timestamp bincode serialization roundtrip.
    #[test]
    fn timestamp_bincode_roundtrip(secs in 0u64..u64::MAX) {
        let ts = Timestamp::new(secs);
        let encoded = bincode::serialize(&ts).unwrap();
        let decoded: Timestamp = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, ts);
    }
}
