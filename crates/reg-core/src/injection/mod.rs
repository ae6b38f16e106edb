//! Inyección determinista de parámetros.
//!
//! Un `ParamInjector` recibe los parámetros base y devuelve un objeto con las
//! claves a sobrescribir; `CompositeInjector` aplica una secuencia de
//! inyectores con merge shallow, en orden fijo.

pub mod composite;
pub mod merge;
pub mod overrides;
pub mod param_injector;

pub use composite::CompositeInjector;
pub use merge::merge_json;
pub use overrides::{parse_override, parse_scalar, OverrideInjector};
pub use param_injector::ParamInjector;
