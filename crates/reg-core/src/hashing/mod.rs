//! Módulo de hashing y canonicalización JSON.
//!
//! Todos los digests del motor (parámetros, dependencias, outputs y
//! fingerprint agregado) pasan por aquí para poder cambiar de algoritmo sin
//! tocar el resto del core.

pub mod canonical_json;
pub mod hash;

pub use canonical_json::to_canonical_json;
pub use hash::{hash_bytes, hash_str, hash_value, short_hash};
