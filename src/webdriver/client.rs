//! HTTP client for the Appium server
//!
//! Holds one WebDriver session and implements [`Device`] on top of it.
//! Every call is a single synchronous round trip; nothing is pipelined.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Method;
use serde_json::{json, Value};

use crate::common::config::{Capabilities, ServerConfig};
use crate::common::{Error, Result};
use crate::device::{Device, ElementId, Locator, Swipe};

use super::protocol;

/// An open WebDriver session against the Appium server
pub struct WebDriverSession {
    http: reqwest::Client,
    base_url: String,
    session_id: Option<String>,
}

impl WebDriverSession {
    /// Open a session with the given capabilities
    pub async fn connect(server: &ServerConfig, caps: &Capabilities) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(server.request_secs))
            .user_agent(concat!("survey-e2e/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let base_url = server.url.trim_end_matches('/').to_string();
        let mut session = Self {
            http,
            base_url,
            session_id: None,
        };

        let body = protocol::new_session_body(caps);
        tracing::debug!("Creating session: {}", body);

        let value = session
            .call(Method::POST, "/session".to_string(), "new session", Some(body))
            .await
            .map_err(|e| match e {
                Error::EndpointUnreachable { .. } => e,
                other => Error::SessionCreate(other.to_string()),
            })?;
        let id = protocol::parse_session_id(&value)?;

        tracing::info!(session = %id, device = %caps.device_name, "Session created");
        session.session_id = Some(id);
        Ok(session)
    }

    fn session_path(&self, suffix: &str) -> Result<String> {
        let id = self.session_id.as_deref().ok_or(Error::SessionClosed)?;
        Ok(format!("/session/{}{}", id, suffix))
    }

    /// Perform one request and unwrap its `value`
    async fn call(
        &self,
        method: Method,
        path: String,
        command: &str,
        body: Option<Value>,
    ) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        tracing::trace!("WD >>> {} {} {:?}", method, url, body);

        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                Error::EndpointUnreachable {
                    url: self.base_url.clone(),
                    reason: e.to_string(),
                }
            } else {
                Error::Http(e)
            }
        })?;

        let status = response.status();
        let text = response.text().await?;
        tracing::trace!("WD <<< {} {}", status, text);

        let body: Value = serde_json::from_str(&text).map_err(|_| {
            Error::Protocol(format!(
                "{} returned HTTP {} with a non-JSON body",
                command, status
            ))
        })?;

        protocol::unwrap_value(command, body)
    }

    async fn session_post(&self, suffix: &str, command: &str, body: Value) -> Result<Value> {
        let path = self.session_path(suffix)?;
        self.call(Method::POST, path, command, Some(body)).await
    }

    async fn session_get(&self, suffix: &str, command: &str) -> Result<Value> {
        let path = self.session_path(suffix)?;
        self.call(Method::GET, path, command, None).await
    }
}

#[async_trait]
impl Device for WebDriverSession {
    async fn find_elements(&mut self, locator: &Locator) -> Result<Vec<ElementId>> {
        let result = self
            .session_post("/elements", "find elements", protocol::locator_body(locator))
            .await;
        match result {
            Ok(value) => protocol::parse_elements(&value),
            Err(e) if e.is_no_such_element() => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    async fn click(&mut self, element: &ElementId) -> Result<()> {
        let suffix = format!("/element/{}/click", element);
        // POSTs without parameters still need an empty JSON object
        self.session_post(&suffix, "click", json!({})).await?;
        Ok(())
    }

    async fn clear(&mut self, element: &ElementId) -> Result<()> {
        let suffix = format!("/element/{}/clear", element);
        self.session_post(&suffix, "clear", json!({})).await?;
        Ok(())
    }

    async fn send_keys(&mut self, element: &ElementId, text: &str) -> Result<()> {
        let suffix = format!("/element/{}/value", element);
        self.session_post(&suffix, "send keys", json!({ "text": text }))
            .await?;
        Ok(())
    }

    async fn attribute(&mut self, element: &ElementId, name: &str) -> Result<Option<String>> {
        let suffix = format!("/element/{}/attribute/{}", element, name);
        let value = self.session_get(&suffix, "get attribute").await?;
        Ok(protocol::parse_attribute(value))
    }

    async fn is_displayed(&mut self, element: &ElementId) -> Result<bool> {
        let suffix = format!("/element/{}/displayed", element);
        let value = self.session_get(&suffix, "is displayed").await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn page_source(&mut self) -> Result<String> {
        let value = self.session_get("/source", "page source").await?;
        protocol::parse_string("page source", value)
    }

    async fn screenshot(&mut self) -> Result<Vec<u8>> {
        let value = self.session_get("/screenshot", "screenshot").await?;
        let encoded = protocol::parse_string("screenshot", value)?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| Error::Protocol(format!("screenshot is not valid base64: {}", e)))
    }

    async fn swipe(&mut self, swipe: Swipe) -> Result<()> {
        self.session_post("/actions", "swipe", protocol::swipe_actions(swipe))
            .await?;
        Ok(())
    }

    async fn terminate_app(&mut self, package: &str) -> Result<()> {
        let body = protocol::mobile_command("terminateApp", json!({ "appId": package }));
        self.session_post("/execute/sync", "terminate app", body)
            .await?;
        Ok(())
    }

    async fn activate_app(&mut self, package: &str) -> Result<()> {
        let body = protocol::mobile_command("activateApp", json!({ "appId": package }));
        self.session_post("/execute/sync", "activate app", body)
            .await?;
        Ok(())
    }

    async fn current_package(&mut self) -> Result<String> {
        let value = self
            .session_get("/appium/device/current_package", "current package")
            .await?;
        protocol::parse_string("current package", value)
    }

    async fn current_activity(&mut self) -> Result<String> {
        let value = self
            .session_get("/appium/device/current_activity", "current activity")
            .await?;
        protocol::parse_string("current activity", value)
    }

    async fn contexts(&mut self) -> Result<Vec<String>> {
        let value = self.session_get("/contexts", "contexts").await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn set_context(&mut self, name: &str) -> Result<()> {
        self.session_post("/context", "set context", json!({ "name": name }))
            .await?;
        Ok(())
    }

    async fn press_keycode(&mut self, keycode: i32) -> Result<()> {
        self.session_post(
            "/appium/device/press_keycode",
            "press keycode",
            json!({ "keycode": keycode }),
        )
        .await?;
        Ok(())
    }

    async fn quit(&mut self) -> Result<()> {
        let path = self.session_path("")?;
        self.call(Method::DELETE, path, "delete session", None)
            .await?;
        if let Some(id) = self.session_id.take() {
            tracing::info!(session = %id, "Session closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed_session() -> WebDriverSession {
        WebDriverSession {
            http: reqwest::Client::new(),
            base_url: "http://127.0.0.1:4723".to_string(),
            session_id: None,
        }
    }

    #[tokio::test]
    async fn test_closed_session_refuses_commands() {
        let mut session = closed_session();
        assert!(matches!(session.quit().await, Err(Error::SessionClosed)));
        assert!(matches!(
            session.click(&ElementId::new("e1")).await,
            Err(Error::SessionClosed)
        ));
    }

    #[test]
    fn test_session_paths() {
        let mut session = closed_session();
        assert!(session.session_path("/source").is_err());
        session.session_id = Some("abc".to_string());
        assert_eq!(session.session_path("/source").unwrap(), "/session/abc/source");
        assert_eq!(session.session_path("").unwrap(), "/session/abc");
    }
}
