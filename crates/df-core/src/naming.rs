//! Unique name generation.

/// Return `base` if no existing name uses it; otherwise bump the trailing
/// number of `base` (appending one if absent) until the name is free.
///
/// `unique_name("n1", ["n1", "n2"])` yields `"n3"`.
pub fn unique_name<'a, I>(base: &str, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let taken: Vec<&str> = existing.into_iter().collect();
    if !taken.contains(&base) {
        return base.to_string();
    }

    let stem = base.trim_end_matches(|c: char| c.is_ascii_digit());
    let mut counter: u64 = base[stem.len()..].parse().unwrap_or(0);
    loop {
        counter += 1;
        let candidate = format!("{stem}{counter}");
        if !taken.contains(&candidate.as_str()) {
            return candidate;
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn generated_name_is_never_taken(names in prop::collection::vec("n[0-9]{1,2}", 0..12)) {
            let existing: Vec<&str> = names.iter().map(String::as_str).collect();
            let name = unique_name("n1", existing.iter().copied());
            prop_assert!(!existing.contains(&name.as_str()));
        }
    }
}
