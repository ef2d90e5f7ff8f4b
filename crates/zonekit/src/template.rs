//! `{KEY}` marker substitution shared by the job scripts and catalog templates.

/// Replace every `{KEY}` marker with its value, one slot after another.
///
/// Slots are applied in iteration order, so a value inserted by an earlier
/// slot can still be rewritten by a later one. Markers without a slot are left
/// as they are.
pub fn substitute<'a, I>(template: &str, slots: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut out = template.to_owned();

    for (key, value) in slots {
        let marker = format!("{{{}}}", key);
        if out.contains(&marker) {
            out = out.replace(&marker, value);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_all_occurrences() {
        let out = substitute("{a}/{b}/{a}", [("a", "x"), ("b", "y")]);
        assert_eq!(out, "x/y/x");
    }

    #[test]
    fn unknown_markers_are_kept() {
        let out = substitute("{zone}-{later}", [("zone", "europe")]);
        assert_eq!(out, "europe-{later}");
    }

    #[test]
    fn markers_are_case_sensitive() {
        let out = substitute("{NAME} {name}", [("name", "mc")]);
        assert_eq!(out, "{NAME} mc");
    }

    #[test]
    fn slots_apply_in_order() {
        let out = substitute("{outer}", [("outer", "[{inner}]"), ("inner", "ok")]);
        assert_eq!(out, "[ok]");
    }
}
