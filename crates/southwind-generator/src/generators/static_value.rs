//! Literal values with positional arguments.

/// Replace `{0}`, `{1}`, ... in `text` with the matching argument.
///
/// Placeholders without a matching argument are left as written.
pub fn substitute_arguments(text: &str, arguments: &[String]) -> String {
    let mut result = text.to_string();
    for (position, argument) in arguments.iter().enumerate() {
        result = result.replace(&format!("{{{position}}}"), argument);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments() {
        assert_eq!(substitute_arguments("plain", &[]), "plain");
    }

    #[test]
    fn test_positional_arguments() {
        let args = vec!["north".to_string(), "7".to_string()];
        assert_eq!(substitute_arguments("C-{0}-{1}-{0}", &args), "C-north-7-north");
    }

    #[test]
    fn test_missing_argument_left_alone() {
        let args = vec!["a".to_string()];
        assert_eq!(substitute_arguments("{0}{1}", &args), "a{1}");
    }
}
