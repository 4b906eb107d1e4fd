//! Recursive deep merge of two JSON values.
//!
//! Objects are merged key by key, arrays stored under the same key are
//! concatenated, and everything else is taken from the incoming side.
//! When the two sides are not both objects the base is returned untouched.

use serde_json::{Map, Value};

/// Merge `incoming` on top of `base`, returning a new value.
///
/// Neither argument is modified. Key order of the result is base keys in
/// base order followed by keys only present in `incoming`, in its order.
pub fn merge(base: &Value, incoming: &Value) -> Value {
    let mut out = base.clone();
    merge_into(&mut out, incoming.clone());
    out
}

/// In-place variant of [`merge`] used when folding many documents.
///
/// Leaves `acc` unchanged unless both sides are objects.
pub fn merge_into(acc: &mut Value, incoming: Value) {
    let (Value::Object(base), Value::Object(incoming)) = (acc, incoming) else {
        return;
    };

    for (key, value) in incoming {
        let Some(slot) = base.get_mut(&key) else {
            base.insert(key, value);
            continue;
        };

        match value {
            Value::Object(_) => merge_into(slot, value),
            Value::Array(items) => match slot {
                Value::Array(existing) => existing.extend(items),
                _ => *slot = Value::Array(items),
            },
            scalar => *slot = scalar,
        }
    }
}

/// Left fold of [`merge`] starting from an empty object.
pub fn merge_all<I>(values: I) -> Value
where
    I: IntoIterator<Item = Value>,
{
    values.into_iter().fold(Value::Object(Map::new()), |mut acc, v| {
        merge_into(&mut acc, v);
        acc
    })
}
