use base64::Engine;
use serde::de::DeserializeOwned;
use snafu::prelude::*;

use crate::common::{
    key_file_or_string, BackendSnafu, ConfigSnafu, NetworkSnafu, NotFoundSnafu, Result,
    ResponseSnafu, RewriteBackend, RewriteIdentity, RewriteRecord, RewriteSettings,
};

use super::models::{ListResponse, UpdateRequest};

pub const BACKEND_NAME: &str = "AdGuardHome";

/// Client for the `/control/rewrite` endpoints of an AdGuard Home instance.
pub struct AdGuardBackend {
    agent: ureq::Agent,
    base_url: String,
    authorization: Option<String>,
}

impl AdGuardBackend {
    pub fn new(base_url: &url::Url) -> Self {
        Self {
            agent: ureq::agent(),
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            authorization: None,
        }
    }

    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        let token =
            base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
        self.authorization = Some(format!("Basic {token}"));
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/control/rewrite/{path}", self.base_url)
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        tracing::debug!(url = url, method = method, backend = BACKEND_NAME, "Sending request");
        let req = self.agent.request(method, url);
        match &self.authorization {
            Some(auth) => req.set("Authorization", auth),
            None => req,
        }
    }

    fn call(&self, method: &str, path: &str) -> Result<ureq::Response> {
        let url = self.endpoint(path);
        let result = self.request(method, &url).call();
        check_status(method, &url, result)
    }

    fn send(
        &self,
        method: &str,
        path: &str,
        body: impl serde::Serialize,
    ) -> Result<ureq::Response> {
        let url = self.endpoint(path);
        let result = self.request(method, &url).send_json(body);
        check_status(method, &url, result)
    }

    fn read_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.call("GET", path)?
            .into_json()
            .boxed_local()
            .context(ResponseSnafu {
                message: format!("Failed to deserialize {path} response"),
            })
    }
}

/// Sorts a ureq outcome into the crate's error taxonomy.
fn check_status(
    method: &str,
    url: &str,
    result: std::result::Result<ureq::Response, ureq::Error>,
) -> Result<ureq::Response> {
    match result {
        Ok(resp) => Ok(resp),
        Err(ureq::Error::Status(status, resp)) => {
            let message = resp.into_string().unwrap_or_default().trim().to_string();
            // Stale identities come back as 400 with a "not found" text on some versions.
            if status == 404 || (status == 400 && message.to_lowercase().contains("not found")) {
                NotFoundSnafu {
                    method,
                    url,
                    message,
                }
                .fail()
            } else {
                BackendSnafu {
                    method,
                    url,
                    status,
                    message,
                }
                .fail()
            }
        }
        Err(ureq::Error::Transport(transport)) => {
            Err(transport).context(NetworkSnafu { method, url })
        }
    }
}

impl RewriteBackend for AdGuardBackend {
    fn list(&mut self) -> Result<Vec<RewriteRecord>> {
        let records = self.read_json::<ListResponse>("list")?.unwrap_or_default();

        tracing::info!(
            backend = BACKEND_NAME,
            records = records.len(),
            "Read completed",
        );

        Ok(records)
    }

    fn create(&mut self, record: &RewriteRecord) -> Result<RewriteRecord> {
        record.validate()?;
        self.send("POST", "add", record)?;

        tracing::info!(
            backend = BACKEND_NAME,
            domain = record.domain,
            answer = record.answer,
            enabled = record.enabled,
            "Created rewrite",
        );

        Ok(record.clone())
    }

    fn update(&mut self, target: &RewriteIdentity, record: &RewriteRecord) -> Result<RewriteRecord> {
        record.validate()?;
        self.send(
            "PUT",
            "update",
            UpdateRequest {
                target,
                update: record,
            },
        )?;

        tracing::info!(
            backend = BACKEND_NAME,
            rewrite = %target,
            domain = record.domain,
            answer = record.answer,
            enabled = record.enabled,
            "Updated rewrite",
        );

        Ok(record.clone())
    }

    fn delete(&mut self, target: &RewriteIdentity) -> Result<()> {
        self.send("POST", "delete", target)?;

        tracing::info!(backend = BACKEND_NAME, rewrite = %target, "Deleted rewrite");

        Ok(())
    }

    fn settings(&mut self) -> Result<RewriteSettings> {
        self.read_json("settings")
    }

    fn set_settings(&mut self, settings: RewriteSettings) -> Result<()> {
        self.send("PUT", "settings/update", settings)?;

        tracing::info!(
            backend = BACKEND_NAME,
            enabled = settings.enabled,
            "Updated rewrite settings",
        );

        Ok(())
    }
}

impl TryFrom<super::Config> for AdGuardBackend {
    type Error = crate::common::Error;

    fn try_from(value: super::Config) -> Result<Self> {
        ensure!(
            matches!(value.base_url.scheme(), "http" | "https"),
            ConfigSnafu {
                message: format!("{} is not a HTTP URL", value.base_url),
                prefix: "adguard.base_url",
            }
        );

        let backend = Self::new(&value.base_url);
        Ok(match (value.username, value.password) {
            (None, None) => backend,
            (username, password) => {
                let password = match password {
                    Some(p) => key_file_or_string(p, "adguard.password")?,
                    None => String::new(),
                };
                backend.with_credentials(&username.unwrap_or_default(), &password)
            }
        })
    }
}
