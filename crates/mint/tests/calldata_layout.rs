use impact_crypto::{function_selector, keccak256};
use impact_mint::{
    decode_revert, encode_create_allowlist, ErrorRegistry, RevertReason, TransferRestrictions,
    CREATE_ALLOWLIST_SIGNATURE,
};
use proptest::prelude::*;

const OWNER: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";

fn read_word_u128(data: &[u8], word: usize) -> u128 {
    let mut buf = [0u8; 16];
    buf.copy_from_slice(&data[word * 32 + 16..word * 32 + 32]);
    u128::from_be_bytes(buf)
}

proptest! {
    #[test]
    fn uri_tail_round_trips(uri in "[a-zA-Z0-9:/._-]{1,200}", units in 1u128..=100_000_000, mode in 0u8..3) {
        let restrictions = match mode {
            0 => TransferRestrictions::AllowAll,
            1 => TransferRestrictions::DisallowAll,
            _ => TransferRestrictions::FromCreatorOnly,
        };
        let root = keccak256(uri.as_bytes());
        let call = encode_create_allowlist(OWNER, units, &root, &uri, restrictions).unwrap();

        prop_assert_eq!(call.selector, function_selector(CREATE_ALLOWLIST_SIGNATURE));
        prop_assert_eq!(call.data.len() % 32, 0);
        prop_assert_eq!(read_word_u128(&call.data, 1), units);
        prop_assert_eq!(&call.data[64..96], &root[..]);
        prop_assert_eq!(read_word_u128(&call.data, 3), 0xa0);
        prop_assert_eq!(read_word_u128(&call.data, 4), u128::from(mode));

        let len = read_word_u128(&call.data, 5) as usize;
        prop_assert_eq!(len, uri.len());
        prop_assert_eq!(&call.data[192..192 + len], uri.as_bytes());
        prop_assert!(call.data[192 + len..].iter().all(|b| *b == 0));
    }

    #[test]
    fn decoding_arbitrary_bytes_never_panics(data in prop::collection::vec(any::<u8>(), 0..200)) {
        let registry = ErrorRegistry::with_minter_errors();
        let _ = decode_revert(&registry, &data);
    }
}

#[test]
fn unknown_selector_keeps_raw_data() {
    let registry = ErrorRegistry::with_minter_errors();
    let reason = decode_revert(&registry, &[0xde, 0xad, 0xbe, 0xef, 0x01]);
    let json = serde_json::to_value(&reason).unwrap();
    assert_eq!(json["kind"], "unknown");
    assert_eq!(json["data"], "0xdeadbeef01");
    assert!(matches!(reason, RevertReason::Unknown { .. }));
}
