//! Merge shallow determinista: las claves de `b` reemplazan a las de `a`.
//! Las claves nuevas se agregan al final, por lo que el orden del archivo de
//! parámetros se conserva.

use serde_json::Value;

pub fn merge_json(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Object(ma), Value::Object(mb)) => {
            let mut out = ma.clone();
            for (k, v) in mb.iter() {
                out.insert(k.clone(), v.clone());
            }
            Value::Object(out)
        }
        (_, other) => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn override_keeps_key_order() {
        let merged = merge_json(&json!({"alpha": 1, "l1_ratio": 0.5}), &json!({"alpha": 0.1}));
        let keys: Vec<&String> = merged.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["alpha", "l1_ratio"]);
        assert_eq!(merged["alpha"], json!(0.1));
    }
}
