use std::hash::Hasher as _;

use siphasher::sip::SipHasher24;

/// Hash an object or message name.
///
/// SipHash-2-4 with zero keys, so hashes are stable across processes and
/// can be stored in packages.
pub fn name_hash(name: impl AsRef<[u8]>) -> u64 {
	let mut hasher = SipHasher24::new();
	hasher.write(name.as_ref());
	hasher.finish()
}

#[cfg(test)]
#[test]
fn test_name_hash_is_stable() {
	assert_eq!(name_hash("play_button"), name_hash(b"play_button".as_slice()));
	assert_ne!(name_hash("play_button"), name_hash("stop_button"));
	assert_ne!(name_hash(""), 0);
}
