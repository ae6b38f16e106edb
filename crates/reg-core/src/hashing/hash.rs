//! Hash helpers (blake3, salida hex de 64 caracteres).

use blake3::Hasher;
use serde_json::Value;

use super::to_canonical_json;
use crate::constants::SHORT_ID_LEN;

/// Hashea un string y devuelve hex.
pub fn hash_str(input: &str) -> String {
    hash_bytes(input.as_bytes())
}

/// Hashea bytes arbitrarios (contenido de archivos) y devuelve hex.
pub fn hash_bytes(input: &[u8]) -> String {
    let mut h = Hasher::new();
    h.update(input);
    h.finalize().to_hex().to_string()
}

/// Hash de un `Value` sobre su forma canónica.
pub fn hash_value(value: &Value) -> String {
    hash_str(&to_canonical_json(value))
}

/// Prefijo corto de un digest, usado para identificadores legibles.
pub fn short_hash(digest: &str) -> &str {
    let end = digest.len().min(SHORT_ID_LEN);
    &digest[..end]
}
