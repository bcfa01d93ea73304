use crate::dh::{
    create_diffie_hellman, create_diffie_hellman_encoded, create_diffie_hellman_with,
    diffie_hellman_group, get_diffie_hellman, get_diffie_hellman_with, DhConfig, DiffieHellman,
    Encoding, ModpGroup, PrimeSource,
};
use crate::error::Error;
use crate::prime::{PrimeContext, VerifyError};
use num_bigint_dig::BigUint;
use std::sync::Arc;

fn seeded(seed: u64) -> DhConfig {
    DhConfig {
        seed: Some(seed),
        ..DhConfig::default()
    }
}

fn exchange(alice: &mut DiffieHellman, bob: &mut DiffieHellman) {
    let alice_pub = alice.generate_keys();
    let bob_pub = bob.generate_keys();
    let alice_secret = alice.compute_secret(&bob_pub).unwrap();
    let bob_secret = bob.compute_secret(&alice_pub).unwrap();
    assert_eq!(alice_secret, bob_secret);
    assert_eq!(alice_secret.len(), alice.prime().len());
}

#[test]
fn test_group_exchange() {
    for (i, name) in ["modp1", "modp2", "modp5", "modp14"].into_iter().enumerate() {
        let primes = PrimeContext::shared();
        let mut alice =
            get_diffie_hellman_with(name, &seeded(2 * i as u64), Arc::clone(&primes)).unwrap();
        let mut bob = get_diffie_hellman_with(name, &seeded(2 * i as u64 + 1), primes).unwrap();
        assert!(!alice.is_malleable());
        assert_eq!(alice.prime(), name.parse::<ModpGroup>().unwrap().prime());
        assert_eq!(alice.generator(), vec![2]);
        exchange(&mut alice, &mut bob);
    }
}

#[test]
fn test_group_lookup() {
    let dh = get_diffie_hellman("modp15").unwrap();
    assert_eq!(dh.prime().len(), 384);
    assert_eq!(
        diffie_hellman_group("modp16").unwrap().prime(),
        ModpGroup::Modp16.prime()
    );
    assert!(matches!(
        get_diffie_hellman("modp7"),
        Err(Error::UnknownGroup(_))
    ));
}

#[test]
fn test_generated_primes_verify_clean() {
    let primes = Arc::new(PrimeContext::with_rounds(20));
    for bits in [16, 17, 18, 20, 21, 22, 64, 65, 128] {
        for generator in [2u8, 5] {
            let config = seeded(bits as u64 * 10 + u64::from(generator));
            let dh = create_diffie_hellman_with(
                PrimeSource::Bits(bits),
                Some(&[generator][..]),
                &config,
                Arc::clone(&primes),
            )
            .unwrap();
            assert!(dh.is_malleable());
            let p = BigUint::from_bytes_be(&dh.prime());
            assert!(p.bits() <= bits + 1, "{} bits requested, got {}", bits, p.bits());
            assert_eq!(
                dh.verify_error(),
                VerifyError::NONE,
                "{}-bit prime {:x} with generator {}",
                bits,
                p,
                generator
            );
        }
    }
}

#[test]
fn test_small_requests_get_fixed_prime() {
    for bits in [1, 8, 15] {
        let dh = create_diffie_hellman(PrimeSource::Bits(bits), None).unwrap();
        assert_eq!(dh.prime(), vec![0x8c, 0x7b]);
        assert_eq!(dh.verify_error().bits(), 0);

        let dh = create_diffie_hellman(PrimeSource::Bits(bits), Some(&[3][..])).unwrap();
        assert_eq!(dh.prime(), vec![0x8c, 0x27]);
        assert!(dh.verify_error().contains(VerifyError::UNABLE_TO_CHECK_GENERATOR));
    }
}

#[test]
fn test_generated_prime_exchange() {
    let primes = PrimeContext::shared();
    let config = seeded(42);
    let mut alice = create_diffie_hellman_with(
        PrimeSource::Bits(96),
        None,
        &config,
        Arc::clone(&primes),
    )
    .unwrap();
    // Same seed, same prime.
    let mut bob =
        create_diffie_hellman_with(PrimeSource::Bits(96), None, &config, primes).unwrap();
    assert_eq!(alice.prime(), bob.prime());
    bob.set_private_key(&[0x12, 0x34, 0x56]).unwrap();
    exchange(&mut alice, &mut bob);
}

#[test]
fn test_prime_generation_cap_propagates() {
    let config = DhConfig {
        seed: Some(1),
        max_prime_attempts: Some(0),
    };
    let result =
        create_diffie_hellman_with(PrimeSource::Bits(256), None, &config, PrimeContext::shared());
    assert!(matches!(
        result,
        Err(Error::GenerationExhausted { bits: 256, .. })
    ));
}

#[test]
fn test_verification_vectors() {
    let good: [u8; 8] = [0xdb, 0x10, 0xe7, 0xf6, 0x1a, 0xdc, 0xc1, 0x93];
    let even: [u8; 8] = [0xdb, 0x10, 0xe7, 0xf6, 0x1a, 0xdc, 0xc1, 0x94];
    let cases: [(&[u8], &[u8], u8); 6] = [
        (&good, &[2], 0),
        (&good, &[5], 0),
        (&good, &[7], 4),
        (&even, &[2], 9),
        (&even, &[5], 9),
        (&even, &[7], 5),
    ];
    for (prime, generator, code) in cases {
        let dh = create_diffie_hellman(prime, Some(generator)).unwrap();
        assert_eq!(dh.verify_error().bits(), code, "generator {:?}", generator);
    }
}

#[test]
fn test_verification_shared_across_objects() {
    let primes = Arc::new(PrimeContext::new());
    let prime: [u8; 8] = [0xdb, 0x10, 0xe7, 0xf6, 0x1a, 0xdc, 0xc1, 0x93];
    let config = DhConfig::default();
    let a = create_diffie_hellman_with(&prime[..], None, &config, Arc::clone(&primes)).unwrap();
    let b = create_diffie_hellman_with(&prime[..], None, &config, Arc::clone(&primes)).unwrap();
    assert_eq!(a.verify_error(), b.verify_error());
    assert_eq!(primes.checks().len(), 1);

    // A different generator on the same prime is its own entry.
    let five: &[u8] = &[5];
    let c =
        create_diffie_hellman_with(&prime[..], Some(five), &config, Arc::clone(&primes)).unwrap();
    assert_eq!(c.verify_error().bits(), 0);
    assert_eq!(primes.checks().len(), 2);
}

#[test]
fn test_locked_groups_report_unsuitable_generator() {
    let primes = Arc::new(PrimeContext::new());
    let dh = get_diffie_hellman_with("modp2", &DhConfig::default(), Arc::clone(&primes)).unwrap();
    assert_eq!(dh.verify_error().bits(), 8);
    // Reported without running the check.
    assert!(primes.checks().is_empty());

    // Checked for real, the group prime is safe but 23 mod 24, so generator 2 is flagged.
    let ctx = PrimeContext::with_rounds(8);
    let p = BigUint::from_bytes_be(ModpGroup::Modp2.prime());
    assert_eq!(ctx.check_prime(&p, &[2]), VerifyError::NOT_SUITABLE_GENERATOR);
}

#[test]
fn test_secret_padding() {
    let mut dh = create_diffie_hellman_with(
        vec![0x8c, 0x7b],
        None,
        &seeded(3),
        PrimeContext::shared(),
    )
    .unwrap();
    dh.generate_keys();
    assert_eq!(dh.compute_secret(&[1]).unwrap(), vec![0, 1]);

    let private = BigUint::from_bytes_be(&dh.private_key().unwrap());
    let other = BigUint::from(0x1234u32);
    let expected = other.modpow(&private, &BigUint::from(0x8c7bu32));
    let secret = dh.compute_secret(&other.to_bytes_be()).unwrap();
    assert_eq!(secret.len(), 2);
    assert_eq!(BigUint::from_bytes_be(&secret), expected);
}

#[test]
fn test_malleability_gate() {
    let mut open = create_diffie_hellman(vec![0x8c, 0x7b], None).unwrap();
    open.set_private_key(&[3]).unwrap();
    open.set_public_key(&[4]).unwrap();
    assert_eq!(open.private_key().unwrap(), vec![3]);
    assert_eq!(open.public_key().unwrap(), vec![4]);

    let mut locked = get_diffie_hellman("modp1").unwrap();
    assert!(matches!(
        locked.set_public_key(&[4]),
        Err(Error::NotPermitted(_))
    ));
    assert!(matches!(
        locked.set_public_key_encoded("04", Encoding::Hex),
        Err(Error::NotPermitted(_))
    ));
    assert!(locked.private_key().is_err());
    locked.generate_keys();
    assert!(locked.private_key().is_ok());
}

#[test]
fn test_encoded_construction() {
    let dh = create_diffie_hellman_encoded(
        "db10e7f61adcc193",
        Encoding::Hex,
        Some(("BQ==", Encoding::Base64)),
    )
    .unwrap();
    assert_eq!(dh.generator(), vec![5]);
    assert_eq!(dh.verify_error().bits(), 0);

    let dh = create_diffie_hellman_encoded("\u{8c}{", Encoding::Binary, None).unwrap();
    assert_eq!(dh.prime(), vec![0x8c, 0x7b]);
    assert_eq!(dh.generator(), vec![2]);

    assert!(matches!(
        create_diffie_hellman_encoded("xyz", Encoding::Hex, None),
        Err(Error::Hex(_))
    ));
    assert!(matches!(
        create_diffie_hellman_encoded("", Encoding::Hex, None),
        Err(Error::InvalidInput(_))
    ));
}
