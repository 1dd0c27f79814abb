use impact_crypto::{
    encode_address_uint, keccak256, standard_leaf_hash, verify_proof, Hash32, StandardMerkleTree,
};
use proptest::prelude::*;

fn leaves_from(rows: &[([u8; 20], u64)]) -> Vec<Hash32> {
    rows.iter()
        .map(|(addr, units)| standard_leaf_hash(&encode_address_uint(addr, *units as u128)))
        .collect()
}

proptest! {
    #[test]
    fn every_generated_proof_verifies(
        rows in prop::collection::vec((any::<[u8; 20]>(), 1u64..=100_000_000), 1..40)
    ) {
        let leaves = leaves_from(&rows);
        let tree = StandardMerkleTree::from_leaf_hashes(&leaves).unwrap();

        for (i, leaf) in leaves.iter().enumerate() {
            let proof = tree.proof(i).unwrap();
            prop_assert!(verify_proof(&tree.root(), *leaf, &proof));
        }
    }

    #[test]
    fn root_is_independent_of_input_order(
        rows in prop::collection::vec((any::<[u8; 20]>(), 1u64..=100_000_000), 1..20)
    ) {
        let leaves = leaves_from(&rows);
        let mut reversed = leaves.clone();
        reversed.reverse();

        let a = StandardMerkleTree::from_leaf_hashes(&leaves).unwrap();
        let b = StandardMerkleTree::from_leaf_hashes(&reversed).unwrap();
        prop_assert_eq!(a.root(), b.root());
    }

    #[test]
    fn tampered_proof_is_rejected(
        rows in prop::collection::vec((any::<[u8; 20]>(), 1u64..=100_000_000), 2..20),
        pick in any::<prop::sample::Index>(),
    ) {
        let leaves = leaves_from(&rows);
        let tree = StandardMerkleTree::from_leaf_hashes(&leaves).unwrap();
        let i = pick.index(leaves.len());

        let mut proof = tree.proof(i).unwrap();
        prop_assume!(!proof.is_empty());
        proof[0] = keccak256(&proof[0]);
        prop_assert!(!verify_proof(&tree.root(), leaves[i], &proof));
    }
}
