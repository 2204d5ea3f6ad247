pub(crate) fn parse_ref_path(path: &str) -> Vec<String> {
    split_path(path).into_iter().map(ToString::to_string).collect()
}

/// Replaces the field at `path` inside `target`, rebuilding every value on
/// the way since fields are edited by copy.
pub(crate) fn assign_nested_path(
    target: &mut Value,
    path: &[String],
    value: Value,
) -> Result<(), String> {
    let Some((head, rest)) = path.split_first() else {
        *target = value;
        return Ok(());
    };

    let field = if rest.is_empty() {
        value
    } else {
        let mut child = target.property(head);
        if child.is_null() {
            return Err(format!("missing field \"{}\" on {}", head, target.type_name()));
        }
        assign_nested_path(&mut child, rest, value)?;
        child
    };

    match target.with_property(head, &field) {
        Some(updated) => {
            *target = updated;
            Ok(())
        }
        None => Err(format!(
            "cannot set \"{}\" on {} to {}",
            head,
            target.type_name(),
            field.type_name()
        )),
    }
}
