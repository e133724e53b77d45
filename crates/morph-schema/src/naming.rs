/// JavaBeans property-name decapitalisation: `Name` becomes `name`, but a name whose first two
/// characters are upper case (`URL`, `ID`) is kept as is.
pub fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    if chars.next().is_some_and(char::is_uppercase) && first.is_uppercase() {
        return name.to_string();
    }
    first.to_lowercase().chain(name.chars().skip(1)).collect()
}

/// Strip `prefix` and decapitalise the remainder; `None` unless something follows the prefix.
pub(crate) fn property_name(method: &str, prefix: &str) -> Option<String> {
    let rest = method.strip_prefix(prefix)?;
    rest.chars()
        .next()
        .is_some_and(|c| !c.is_lowercase())
        .then(|| decapitalize(rest))
}

/// Like [`property_name`] but also strips `suffix`, e.g. `getTagsList` -> `tags`.
pub(crate) fn property_name_between(method: &str, prefix: &str, suffix: &str) -> Option<String> {
    let rest = method.strip_prefix(prefix)?.strip_suffix(suffix)?;
    rest.chars()
        .next()
        .is_some_and(|c| !c.is_lowercase())
        .then(|| decapitalize(rest))
}
