mod avtransport_client;
mod connection_manager_client;

pub use avtransport_client::AvTransportClient;
pub use connection_manager_client::ConnectionManagerClient;

use std::collections::HashMap;

use crate::errors::ControlPointError;

/// Resolve a possibly relative controlURL against the description URL.
///
/// - If `control_url` is already absolute (starts with http:// or https://), it is returned as-is.
/// - Otherwise, it is resolved against the scheme://host:port of `description_url`.
pub fn resolve_control_url(description_url: &str, control_url: &str) -> String {
    if control_url.starts_with("http://") || control_url.starts_with("https://") {
        return control_url.to_string();
    }

    if let Some((scheme, rest)) = description_url.split_once("://") {
        let authority = rest.split('/').next().unwrap_or(rest);
        let base = format!("{}://{}", scheme, authority);

        if control_url.starts_with('/') {
            return format!("{}{}", base, control_url);
        } else {
            return format!("{}/{}", base, control_url);
        }
    }

    control_url.to_string()
}

pub(crate) fn required_value<'a>(
    values: &'a HashMap<String, String>,
    name: &str,
) -> Result<&'a str, ControlPointError> {
    values
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| ControlPointError::upnp_missing_return_value(name))
}
