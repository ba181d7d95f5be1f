use crate::record::Fields;

/// Merge an ordered sequence of field maps into one.
///
/// Keys are inserted in layer order, so a key appearing in a later layer
/// replaces the value from an earlier one. This is the single merge
/// primitive behind every log record: base fields, then trace fields,
/// then caller-supplied extras.
pub fn merge_layers<I>(layers: I) -> Fields
where
    I: IntoIterator<Item = Fields>,
{
    let mut merged = Fields::new();
    for layer in layers {
        for (key, value) in layer {
            merged.insert(key, value);
        }
    }
    merged
}
