use sb_core::{Direction, ValueKind};

/// `hero_bullet` → `HeroBullet`.
pub(crate) fn pascal_case(name: &str) -> String {
    identifier(name)
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Keeps ASCII alphanumerics, maps everything else to `_`, never starts
/// with a digit.
pub(crate) fn identifier(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
        .collect();
    if out.is_empty() || out.starts_with(|ch: char| ch.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

pub(crate) fn kind_tag(kind: ValueKind) -> &'static str {
    match kind {
        ValueKind::Integer => "integer",
        ValueKind::Decimal => "decimal",
        ValueKind::Point => "point",
        ValueKind::Boolean => "boolean",
        ValueKind::String => "string",
        ValueKind::Direction => "direction",
        ValueKind::StateName => "state",
        ValueKind::AnimationName => "animation",
        ValueKind::Sprite => "sprite",
        ValueKind::Null => "value",
    }
}

pub(crate) fn c_type(kind: ValueKind, state_type: &str) -> String {
    match kind {
        ValueKind::Integer => "int".to_string(),
        ValueKind::Decimal | ValueKind::Null => "float".to_string(),
        ValueKind::Point => "Point".to_string(),
        ValueKind::Boolean => "bool".to_string(),
        ValueKind::String | ValueKind::AnimationName => "const char *".to_string(),
        ValueKind::Direction => "Direction".to_string(),
        ValueKind::StateName => state_type.to_string(),
        ValueKind::Sprite => "Sprite *".to_string(),
    }
}

pub(crate) fn c_float(value: f32) -> String {
    if value.is_finite() {
        format!("{:?}f", value)
    } else {
        log::warn!("non-finite decimal {} emitted as 0", value);
        "0.0f".to_string()
    }
}

pub(crate) fn c_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

pub(crate) fn direction_constant(direction: Direction) -> String {
    format!("Direction{}", pascal_case(direction.name()))
}
