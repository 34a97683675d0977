use serde::Serialize;
use sha2::{Digest, Sha256};

/// Derive a cache key from an operation's qualified name and its arguments.
///
/// Arguments are serialized to JSON and hashed, so keys stay short and equal
/// argument values always produce the same key.
pub fn cache_key<A: Serialize + ?Sized>(scope: &str, args: &A) -> String {
    let encoded = serde_json::to_vec(args).unwrap_or_default();
    let digest = Sha256::digest(&encoded);
    format!("{scope}.{}", hex::encode(digest))
}
