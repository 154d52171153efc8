use mixcrypt_core::{Id, IdType};
use mixcrypt_crypto::LargeInt;
use mixcrypt_group::{
    new_kdf_key, new_key_fingerprint, new_mac, Group, GroupKey, InternalMessage, Member, Membership,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn member(tag: u8) -> Member {
    Member::new(Id::new([tag; 32], IdType::User), LargeInt::from_u64(u64::from(tag)))
}

#[divan::bench]
fn bench_kdf_key(bencher: divan::Bencher) {
    let key = GroupKey::from_bytes(&[0x42u8; 32]).unwrap();
    let salt = [0x24u8; 32];
    bencher.bench(|| new_kdf_key(divan::black_box(&key), 1000, divan::black_box(&salt)));
}

#[divan::bench]
fn bench_key_fingerprint(bencher: divan::Bencher) {
    let key = GroupKey::from_bytes(&[0x42u8; 32]).unwrap();
    let salt = [0x24u8; 32];
    let id = member(1).id;
    bencher.bench(|| new_key_fingerprint(divan::black_box(&key), &salt, divan::black_box(&id)));
}

#[divan::bench(args = [128, 509, 4096])]
fn bench_mac(bencher: divan::Bencher, size: usize) {
    let crypt_key = [0x11u8; 32];
    let ct = vec![0x5Au8; size];
    let dh = LargeInt::from_u64(0xDEAD_BEEF);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| new_mac(&crypt_key, divan::black_box(&ct), Some(&dh)));
}

#[divan::bench(args = [3, 11])]
fn bench_seal_for_all(bencher: divan::Bencher, members: u8) {
    let mut rng = StdRng::seed_from_u64(0);
    let participants: Vec<Member> = (1..members).map(member).collect();
    let membership = Membership::new(member(0), &participants).unwrap();
    let group = Group::new(membership, &mut rng).unwrap();
    let message = InternalMessage {
        timestamp: 0,
        sender: member(0).id,
        payload: vec![0x33; 200],
    };
    bencher.bench_local(|| group.seal_for_all(&member(0).id, 1, &message, 509, &mut rng).unwrap());
}

fn main() {
    divan::main();
}
