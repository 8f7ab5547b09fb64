use thiserror::Error;

/// An environment variable required by the application is not set, or is blank.
#[derive(Debug, Error)]
#[error("Missing environment variable: {0}")]
pub struct MissingEnvVarError(pub String);

/// Reads an environment variable, returning a structured error if it's missing.
///
/// A variable that is set but contains only whitespace is treated as missing, since
/// credentials exported as `KEY=` are a common misconfiguration.
///
/// # Arguments
/// * `name` - The name of the environment variable to read.
pub fn get_env_var(name: &str) -> Result<String, MissingEnvVarError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(MissingEnvVarError(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_variable_is_reported_by_name() {
        let err = get_env_var("SHARED_UTILS_TEST_SURELY_UNSET_VAR").unwrap_err();
        assert_eq!(err.0, "SHARED_UTILS_TEST_SURELY_UNSET_VAR");
        assert!(err.to_string().contains("SHARED_UTILS_TEST_SURELY_UNSET_VAR"));
    }

    #[test]
    fn present_variable_is_returned() {
        // PATH is set in every environment cargo runs tests in.
        assert!(get_env_var("PATH").is_ok());
    }
}
