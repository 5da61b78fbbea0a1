//! Property-based tests.

use proptest::collection;
use proptest::prelude::*;
use sp800_drbg::{Drbg, DrbgError, TestEntropy, flags};

/// Every supported mechanism selection.
fn any_mechanism() -> impl Strategy<Value = u32> {
    prop_oneof![
        Just(flags::HASH | flags::SHA1),
        Just(flags::HASH | flags::SHA256),
        Just(flags::HASH | flags::SHA384),
        Just(flags::HASH | flags::SHA512),
        Just(flags::HMAC | flags::SHA1),
        Just(flags::HMAC | flags::SHA256),
        Just(flags::HMAC | flags::SHA384),
        Just(flags::HMAC | flags::SHA512),
        Just(flags::CTR | flags::SYM128),
        Just(flags::CTR | flags::SYM192),
        Just(flags::CTR | flags::SYM256),
    ]
}

fn instance(flags_value: u32, pers: &[u8], entropy: &[u8]) -> Drbg {
    // One oversized chunk serves any mechanism's first pull; trailing
    // bytes are ignored by the gateway.
    Drbg::with_entropy_source(
        flags_value,
        pers,
        Box::new(TestEntropy::new([entropy.to_vec()])),
    )
    .expect("Should instantiate with injected entropy")
}

proptest! {
    #[test]
    fn instantiate_establishes_a_fresh_seed(
        mech in any_mechanism(),
        pers in collection::vec(any::<u8>(), 0..256),
        entropy in any::<[u8; 48]>(),
    ) {
        let drbg = instance(mech, &pers, &entropy);
        prop_assert!(drbg.is_seeded());
        prop_assert_eq!(drbg.reseed_count(), 1);
    }

    #[test]
    fn generate_writes_exactly_the_request(
        mech in any_mechanism(),
        entropy in any::<[u8; 48]>(),
        len in 1usize..1024,
    ) {
        let mut drbg = instance(mech, &[], &entropy);
        // Guard bytes beyond the request must survive untouched.
        let mut buf = vec![0xa5u8; len + 8];
        drbg.generate(&mut buf[..len], &[])
            .expect("Should generate");
        prop_assert!(buf[len..].iter().all(|&b| b == 0xa5));
        // An all-sentinel output of any real length is vanishingly
        // unlikely; the request itself must have been written.
        if len >= 8 {
            prop_assert!(buf[..len].iter().any(|&b| b != 0xa5));
        }
    }

    #[test]
    fn fixed_inputs_are_deterministic(
        mech in any_mechanism(),
        entropy in any::<[u8; 48]>(),
        pers in collection::vec(any::<u8>(), 0..64),
        addtl in collection::vec(any::<u8>(), 0..64),
        len in 1usize..512,
    ) {
        let mut a = instance(mech, &pers, &entropy);
        let mut b = instance(mech, &pers, &entropy);
        let mut out_a = vec![0u8; len];
        let mut out_b = vec![0u8; len];
        a.generate(&mut out_a, &addtl).expect("Should generate");
        b.generate(&mut out_b, &addtl).expect("Should generate");
        prop_assert_eq!(&out_a, &out_b);

        a.generate(&mut out_a, &addtl).expect("Should generate");
        b.generate(&mut out_b, &addtl).expect("Should generate");
        prop_assert_eq!(&out_a, &out_b);
    }

    #[test]
    fn oversized_requests_never_write(
        mech in any_mechanism(),
        entropy in any::<[u8; 48]>(),
        excess in 1usize..64,
    ) {
        let mut drbg = instance(mech, &[], &entropy);
        let mut buf = vec![0x5au8; sp800_drbg::MAX_REQUEST_BYTES + excess];
        let result = drbg.generate(&mut buf, &[]);
        prop_assert_eq!(
            result,
            Err(DrbgError::InvalidArgument(
                "requested length exceeds the per-call maximum"
            ))
        );
        prop_assert!(buf.iter().all(|&b| b == 0x5a));
        // The failed request leaves the instance usable.
        let mut small = [0u8; 16];
        drbg.generate(&mut small, &[]).expect("Should generate");
    }

    #[test]
    fn prediction_resistance_pulls_every_call(
        mech in any_mechanism(),
        entropy in any::<[u8; 48]>(),
        calls in 1usize..8,
    ) {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let pulls = Arc::new(AtomicUsize::new(0));
        // One chunk for the instantiate, one per generate call.
        let chunks = std::iter::repeat_n(entropy.to_vec(), calls + 1);
        let source = TestEntropy::with_pull_counter(chunks, pulls.clone());
        let mut drbg = Drbg::with_entropy_source(
            mech | flags::PREDICTION_RESIST,
            &[],
            Box::new(source),
        )
        .expect("Should instantiate with injected entropy");

        let mut out = [0u8; 32];
        for _ in 0..calls {
            drbg.generate(&mut out, &[]).expect("Should generate");
        }
        prop_assert_eq!(pulls.load(Ordering::Relaxed), calls + 1);
    }

    #[test]
    fn reseed_then_reseed_is_well_defined(
        mech in any_mechanism(),
        entropy in any::<[u8; 48]>(),
        addtl in collection::vec(any::<u8>(), 0..64),
    ) {
        let chunks = || {
            vec![entropy.to_vec(), entropy.to_vec(), entropy.to_vec()]
        };
        let mut a = Drbg::with_entropy_source(
            mech,
            &[],
            Box::new(TestEntropy::new(chunks())),
        )
        .expect("Should instantiate");
        let mut b = Drbg::with_entropy_source(
            mech,
            &[],
            Box::new(TestEntropy::new(chunks())),
        )
        .expect("Should instantiate");

        for drbg in [&mut a, &mut b] {
            drbg.reseed(&addtl).expect("Should reseed");
            drbg.reseed(&addtl).expect("Should reseed");
            prop_assert_eq!(drbg.reseed_count(), 1);
        }
        let mut out_a = [0u8; 48];
        let mut out_b = [0u8; 48];
        a.generate(&mut out_a, &[]).expect("Should generate");
        b.generate(&mut out_b, &[]).expect("Should generate");
        prop_assert_eq!(out_a, out_b);
    }
}
