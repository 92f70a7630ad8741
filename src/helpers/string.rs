//! String helpers for command arguments and SQL identifiers.

/// Finds the value bound to `-<key>=<value>` in a list of arguments.
///
/// Every argument is scanned and the last binding wins. Arguments that do not
/// split into exactly two tokens around `=` are skipped.
pub fn get_key<S: AsRef<str>>(key: &str, args: &[S]) -> Option<String> {
    let flag = format!("-{key}");
    let mut value = None;
    for arg in args {
        let tokens: Vec<&str> = arg.as_ref().split('=').collect();
        if tokens.len() != 2 {
            continue;
        }
        if tokens[0] == flag {
            value = Some(tokens[1].to_owned());
        }
    }
    value
}

/// Replaces every space with an underscore so the name can be used as an identifier.
pub fn normalize_key(key: &str) -> String {
    key.replace(' ', "_")
}
