use super::{ConfigSnafu, Result};

/// If the value begins with an '@', read the secret from the file path
/// that follows, otherwise return the value as is.
///
/// prefix names the setting in case of an error.
pub(crate) fn key_file_or_string(value: String, prefix: &str) -> Result<String> {
    Ok(match value.strip_prefix('@') {
        Some(key_file) => std::fs::read_to_string(key_file)
            .map_err(|err| {
                ConfigSnafu {
                    message: format!("Failed to read secret from {key_file}: {err}"),
                    prefix,
                }
                .build()
            })?
            .trim()
            .into(),
        None => value,
    })
}
