#[derive(Clone, serde::Deserialize)]
pub struct Config {
    pub base_url: url::Url,
    pub username: Option<String>,
    /// Prefix with '@' to read the password from a file.
    pub password: Option<String>,
}
