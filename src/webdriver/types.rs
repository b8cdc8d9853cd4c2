//! WebDriver wire types and error-code mapping

use crate::{Error, Result};

/// W3C web element identifier key inside element JSON objects
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Map a W3C error code plus message to a crate error.
///
/// Only the codes the interaction layer distinguishes get their own class;
/// everything else degrades to a generic wire error.
pub fn error_from_code(code: &str, message: String) -> Error {
    match code {
        "stale element reference" => Error::StaleElement(message),
        "element click intercepted" => Error::ClickIntercepted(message),
        "timeout" | "script timeout" => Error::Timeout(message),
        "no such element" => Error::ElementNotFound(message),
        "invalid session id" | "no such window" => Error::SessionNotFound(message),
        "unknown error" if message.contains("net::") => Error::NavigationFailed(message),
        "javascript error" => Error::ScriptExecutionFailed(message),
        _ => Error::Wire(format!("{}: {}", code, message)),
    }
}

/// Extract the element id from a `Find Element` response value
pub fn element_id_from(value: &serde_json::Value) -> Result<String> {
    value
        .get(ELEMENT_KEY)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| Error::wire("No element reference in response"))
}

/// Wrap an element id into the JSON object form script arguments expect
pub fn element_arg(element_id: &str) -> serde_json::Value {
    serde_json::json!({ ELEMENT_KEY: element_id })
}
