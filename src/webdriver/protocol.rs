//! WebDriver wire format
//!
//! Request bodies and response decoding for the W3C WebDriver protocol
//! with the Appium extensions the runner needs. Every response is wrapped
//! as `{"value": ...}`; failures carry `{"value": {"error", "message"}}`.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::common::config::Capabilities;
use crate::common::{Error, Result};
use crate::device::{ElementId, Locator, Swipe};

/// W3C element reference key
pub const W3C_ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Pre-W3C element reference key, still returned by older Appium drivers
pub const LEGACY_ELEMENT_KEY: &str = "ELEMENT";

/// Error payload of a failed command
#[derive(Debug, Deserialize)]
pub struct WireError {
    pub error: String,
    #[serde(default)]
    pub message: String,
}

/// Build the `POST /session` body
///
/// Standard keys go in bare; everything else needs the `appium:` vendor
/// prefix or W3C-mode servers reject the session.
pub fn new_session_body(caps: &Capabilities) -> Value {
    let mut always_match = json!({
        "platformName": caps.platform_name,
        "appium:platformVersion": caps.platform_version,
        "appium:deviceName": caps.device_name,
        "appium:appPackage": caps.app_package,
        "appium:appActivity": caps.app_activity,
        "appium:automationName": caps.automation_name,
        "appium:noReset": caps.no_reset,
    });
    if caps.auto_grant_permissions {
        always_match["appium:autoGrantPermissions"] = json!(true);
    }
    json!({
        "capabilities": {
            "alwaysMatch": always_match,
            "firstMatch": [{}],
        }
    })
}

/// Body for `POST /element(s)`
pub fn locator_body(locator: &Locator) -> Value {
    json!({
        "using": locator.strategy(),
        "value": locator.value(),
    })
}

/// W3C pointer action sequence for a swipe
pub fn swipe_actions(swipe: Swipe) -> Value {
    json!({
        "actions": [{
            "type": "pointer",
            "id": "finger1",
            "parameters": {"pointerType": "touch"},
            "actions": [
                {"type": "pointerMove", "duration": 0, "x": swipe.start_x, "y": swipe.start_y},
                {"type": "pointerDown", "button": 0},
                {"type": "pause", "duration": 100},
                {
                    "type": "pointerMove",
                    "duration": swipe.duration_ms,
                    "origin": "viewport",
                    "x": swipe.end_x,
                    "y": swipe.end_y,
                },
                {"type": "pointerUp", "button": 0},
            ],
        }]
    })
}

/// Body for `POST /execute/sync` running an Appium `mobile:` command
pub fn mobile_command(name: &str, args: Value) -> Value {
    json!({
        "script": format!("mobile: {}", name),
        "args": [args],
    })
}

/// Unwrap the `value` member of a response body
///
/// An object holding a string `error` member is a failed command even when
/// the HTTP status was 200 (some proxies flatten the status).
pub fn unwrap_value(command: &str, body: Value) -> Result<Value> {
    let value = match body {
        Value::Object(mut map) => map.remove("value").unwrap_or(Value::Null),
        other => {
            return Err(Error::Protocol(format!(
                "{} returned a non-object body: {}",
                command, other
            )))
        }
    };

    if let Some(err) = as_wire_error(&value) {
        return Err(Error::webdriver(command, &err.error, &err.message));
    }

    Ok(value)
}

fn as_wire_error(value: &Value) -> Option<WireError> {
    if value.get("error").map(Value::is_string).unwrap_or(false) {
        serde_json::from_value(value.clone()).ok()
    } else {
        None
    }
}

/// Extract the session ID from a new-session response value
pub fn parse_session_id(value: &Value) -> Result<String> {
    value
        .get("sessionId")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::SessionCreate(format!("response has no sessionId: {}", value)))
}

/// Extract an element reference from a single element object
pub fn parse_element(value: &Value) -> Option<ElementId> {
    value
        .get(W3C_ELEMENT_KEY)
        .or_else(|| value.get(LEGACY_ELEMENT_KEY))
        .and_then(Value::as_str)
        .map(ElementId::new)
}

/// Extract element references from a find-elements response value
pub fn parse_elements(value: &Value) -> Result<Vec<ElementId>> {
    let items = value
        .as_array()
        .ok_or_else(|| Error::Protocol(format!("expected element array, got {}", value)))?;
    Ok(items.iter().filter_map(parse_element).collect())
}

/// Attribute values arrive as strings, booleans, or null
pub fn parse_attribute(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Decode a string-valued response
pub fn parse_string(command: &str, value: Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(Error::Protocol(format!(
            "{} expected a string, got {}",
            command, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_body_prefixes_vendor_keys() {
        let body = new_session_body(&Capabilities::default());
        let caps = &body["capabilities"]["alwaysMatch"];
        assert_eq!(caps["platformName"], "Android");
        assert_eq!(caps["appium:appPackage"], "com.example.my_auth_app");
        assert_eq!(caps["appium:noReset"], true);
        assert!(caps.get("appium:autoGrantPermissions").is_none());

        let body = new_session_body(&Capabilities {
            auto_grant_permissions: true,
            ..Capabilities::default()
        });
        assert_eq!(
            body["capabilities"]["alwaysMatch"]["appium:autoGrantPermissions"],
            true
        );
    }

    #[test]
    fn test_unwrap_value_surfaces_wire_errors() {
        let body = json!({"value": {"error": "no such element", "message": "not there"}});
        let err = unwrap_value("find element", body).unwrap_err();
        assert!(err.is_no_such_element());

        let body = json!({"value": {"text": "error in name"}});
        let value = unwrap_value("attribute", body).unwrap();
        assert_eq!(value["text"], "error in name");
    }

    #[test]
    fn test_parse_elements_accepts_both_reference_keys() {
        let value = json!([
            {W3C_ELEMENT_KEY: "a1"},
            {LEGACY_ELEMENT_KEY: "b2"},
            {"unrelated": "x"},
        ]);
        let elements = parse_elements(&value).unwrap();
        assert_eq!(elements, vec![ElementId::new("a1"), ElementId::new("b2")]);
    }

    #[test]
    fn test_parse_session_id() {
        let value = json!({"sessionId": "abc", "capabilities": {}});
        assert_eq!(parse_session_id(&value).unwrap(), "abc");
        assert!(parse_session_id(&json!({})).is_err());
    }

    #[test]
    fn test_parse_attribute_variants() {
        assert_eq!(parse_attribute(Value::Null), None);
        assert_eq!(parse_attribute(json!("City *")), Some("City *".into()));
        assert_eq!(parse_attribute(json!(true)), Some("true".into()));
    }

    #[test]
    fn test_swipe_actions_shape() {
        let body = swipe_actions(Swipe::FORM_SCROLL);
        let steps = body["actions"][0]["actions"].as_array().unwrap();
        assert_eq!(steps.len(), 5);
        assert_eq!(steps[0]["y"], 1500);
        assert_eq!(steps[3]["y"], 300);
        assert_eq!(steps[3]["duration"], 800);
    }

    #[test]
    fn test_mobile_command_body() {
        let body = mobile_command("terminateApp", json!({"appId": "com.example"}));
        assert_eq!(body["script"], "mobile: terminateApp");
        assert_eq!(body["args"][0]["appId"], "com.example");
    }
}
