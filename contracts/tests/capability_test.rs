//! Integration tests for the zero-knowledge capability adapter.
//!
//! One Groth16 setup is shared by every test in this file; proving at a
//! small depth keeps the suite fast.

use ark_std::rand::{rngs::StdRng, SeedableRng};
use notabot_contracts::adapter::{CapabilityAdapter, SourceAdapter};
use notabot_contracts::{CallContext, ContractError, Ledger, LedgerConfig};
use notabot_protocol::codec::encode_capability;
use notabot_protocol::config::{DEFAULT_REWARD_PER_SOURCE, DEFAULT_WORLD_ID_ACTION};
use notabot_protocol::identity::Address;
use notabot_protocol::source::Source;
use notabot_protocol::zkp::{
    external_nullifier, fr_to_bytes, signal_hash, Identity, MembershipParams, MerkleTree,
    UniquenessProver, UniquenessVerifier,
};
use notabot_protocol::IdentityKey;
use std::sync::OnceLock;

const DEPTH: usize = 6;
const APP_ID: &str = "app_notabot";
const T: u64 = 1_700_000_000;

struct Fixture {
    prover: UniquenessProver,
    verifier: UniquenessVerifier,
    tree: MerkleTree,
    members: Vec<Identity>,
}

fn fixture() -> &'static Fixture {
    static FIXTURE: OnceLock<Fixture> = OnceLock::new();
    FIXTURE.get_or_init(|| {
        let mut rng = StdRng::seed_from_u64(42);
        let params = MembershipParams::standard();
        let (prover, verifier) = UniquenessProver::setup(&mut rng, params.clone(), DEPTH).unwrap();
        let mut tree = MerkleTree::new(params.clone(), DEPTH);
        let members: Vec<Identity> = (0..4).map(|_| Identity::random(&mut rng)).collect();
        for m in &members {
            tree.insert(m.commitment(&params)).unwrap();
        }
        Fixture {
            prover,
            verifier,
            tree,
            members,
        }
    })
}

fn admin() -> Address {
    Address::derive("admin")
}

fn adapter_address() -> Address {
    Address::derive("adapter.worldcoin")
}

fn setup(action: &str) -> (Ledger, CapabilityAdapter) {
    let mut ledger = Ledger::new(LedgerConfig {
        admin: admin(),
        oracle: Address::derive("oracle"),
        reward_per_source: DEFAULT_REWARD_PER_SOURCE,
    });
    ledger
        .add_adapter(&CallContext::new(admin(), T), adapter_address(), Source::Worldcoin)
        .unwrap();
    let adapter = CapabilityAdapter::new(
        adapter_address(),
        fixture().verifier.clone(),
        APP_ID,
        action,
    );
    (ledger, adapter)
}

/// Proof by member `idx`, bound to `subject`, for `action`.
fn prove(idx: usize, subject: &Address, action: &str) -> Vec<u8> {
    let f = fixture();
    let path = f.tree.path(idx).unwrap();
    let proof = f
        .prover
        .prove(
            &f.members[idx],
            &path,
            signal_hash(subject),
            external_nullifier(APP_ID, action),
        )
        .unwrap();
    encode_capability(&proof.to_capability())
}

fn ctx() -> CallContext {
    CallContext::new(Address::derive("relayer"), T)
}

#[test]
fn valid_proof_registers_with_nullifier_as_key() {
    let (mut ledger, mut adapter) = setup(DEFAULT_WORLD_ID_ACTION);
    let u = Address::derive("U");

    let accepted = adapter
        .verify_and_register(&mut ledger, &ctx(), u, &prove(0, &u, DEFAULT_WORLD_ID_ACTION))
        .unwrap();

    let f = fixture();
    let expected = f.members[0].nullifier_hash(
        f.prover.params(),
        external_nullifier(APP_ID, DEFAULT_WORLD_ID_ACTION),
    );
    assert_eq!(accepted.identity_key, IdentityKey::from_bytes(fr_to_bytes(&expected)));
    assert_eq!(accepted.quality_score, 100);
    assert_eq!(accepted.source, Source::Worldcoin);
    assert!(ledger.is_verified_human(&u));
    assert!(adapter.is_consumed(&accepted.identity_key));
    assert_eq!(adapter.source_id(), 0);
}

#[test]
fn proof_for_another_subject_is_rejected() {
    let (mut ledger, mut adapter) = setup(DEFAULT_WORLD_ID_ACTION);
    let u = Address::derive("U");
    let proof = prove(1, &u, DEFAULT_WORLD_ID_ACTION);
    assert_eq!(
        adapter
            .verify_and_register(&mut ledger, &ctx(), Address::derive("thief"), &proof)
            .unwrap_err(),
        ContractError::InvalidProof
    );
}

#[test]
fn proof_for_another_action_is_rejected() {
    let (mut ledger, mut adapter) = setup(DEFAULT_WORLD_ID_ACTION);
    let u = Address::derive("U");
    let proof = prove(1, &u, "some-other-action");
    assert_eq!(
        adapter
            .verify_and_register(&mut ledger, &ctx(), u, &proof)
            .unwrap_err(),
        ContractError::InvalidProof
    );
}

#[test]
fn same_member_cannot_verify_twice() {
    let (mut ledger, mut adapter) = setup(DEFAULT_WORLD_ID_ACTION);
    let a = Address::derive("A");
    let b = Address::derive("B");
    adapter
        .verify_and_register(&mut ledger, &ctx(), a, &prove(2, &a, DEFAULT_WORLD_ID_ACTION))
        .unwrap();

    // Fresh proof, different subject, same human: same nullifier.
    assert_eq!(
        adapter
            .verify_and_register(&mut ledger, &ctx(), b, &prove(2, &b, DEFAULT_WORLD_ID_ACTION))
            .unwrap_err(),
        ContractError::ProofAlreadyUsed
    );
    assert!(!ledger.is_verified_human(&b));
}

#[test]
fn pinned_root_must_match() {
    let (mut ledger, adapter) = setup(DEFAULT_WORLD_ID_ACTION);
    let u = Address::derive("U");
    let stale_root = MembershipParams::standard().identity_commitment(1u64.into(), 2u64.into());
    let mut adapter = adapter.with_pinned_root(stale_root);
    assert_eq!(
        adapter
            .verify_and_register(&mut ledger, &ctx(), u, &prove(3, &u, DEFAULT_WORLD_ID_ACTION))
            .unwrap_err(),
        ContractError::UnknownMerkleRoot
    );

    adapter.pin_root(Some(fixture().tree.root()));
    assert!(adapter
        .verify_and_register(&mut ledger, &ctx(), u, &prove(3, &u, DEFAULT_WORLD_ID_ACTION))
        .is_ok());
}

#[test]
fn garbage_bytes_are_malformed() {
    let (mut ledger, mut adapter) = setup(DEFAULT_WORLD_ID_ACTION);
    let u = Address::derive("U");
    assert!(matches!(
        adapter.verify_and_register(&mut ledger, &ctx(), u, &[0u8; 100]),
        Err(ContractError::MalformedProof(_))
    ));
    // Right length, but the root word is not a canonical field element.
    let mut bytes = prove(0, &u, DEFAULT_WORLD_ID_ACTION);
    bytes[..32].copy_from_slice(&[0xff; 32]);
    assert!(matches!(
        adapter.verify_and_register(&mut ledger, &ctx(), u, &bytes),
        Err(ContractError::MalformedProof(_))
    ));

    // Canonical words, but the Groth16 points do not decode.
    let mut bytes = prove(0, &u, DEFAULT_WORLD_ID_ACTION);
    for b in &mut bytes[64..] {
        *b = 0xff;
    }
    assert!(matches!(
        adapter.verify_and_register(&mut ledger, &ctx(), u, &bytes),
        Err(ContractError::MalformedProof(_))
    ));
    assert!(!ledger.is_verified_human(&u));
}
