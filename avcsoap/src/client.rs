use crate::{
    SoapEnvelope, SoapError, action_response, build_soap_request, parse_soap_envelope,
    parse_upnp_fault,
};
use std::{collections::HashMap, time::Duration};
use tracing::{debug, trace};
use ureq::Agent;

/// Result of a SOAP call:
/// - HTTP status code
/// - raw XML body (always)
/// - parsed SOAP envelope if parsing succeeded
#[derive(Debug)]
pub struct SoapCallResult {
    pub status: u16,
    pub raw_body: String,
    pub envelope: Option<SoapEnvelope>,
}

impl SoapCallResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking SOAP client.
///
/// Every request is bounded by the timeout given at construction. HTTP
/// error statuses are not turned into transport errors, so the fault sent
/// with an HTTP 500 can still be decoded.
#[derive(Debug, Clone)]
pub struct SoapClient {
    agent: Agent,
    timeout: Duration,
}

impl SoapClient {
    pub fn new(timeout: Duration) -> Self {
        let config = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build();

        Self {
            agent: config.into(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends one action and returns the raw outcome.
    pub fn call(
        &self,
        control_url: &str,
        service_urn: &str,
        action: &str,
        args: &[(&str, &str)],
    ) -> Result<SoapCallResult, SoapError> {
        let body_xml = build_soap_request(service_urn, action, args)?;
        let soap_action_header = format!(r#""{service_urn}#{action}""#);

        trace!(url = control_url, action, body = %body_xml, "Sending SOAP request");

        let mut response = self
            .agent
            .post(control_url)
            .header("Content-Type", r#"text/xml; charset="utf-8""#)
            .header("SOAPAction", &soap_action_header)
            .send(body_xml)
            .map_err(|source| SoapError::Http {
                url: control_url.to_string(),
                source,
            })?;

        let status = response.status().as_u16();
        let raw_body = response
            .body_mut()
            .read_to_string()
            .map_err(|source| SoapError::Http {
                url: control_url.to_string(),
                source,
            })?;

        let envelope = match parse_soap_envelope(raw_body.as_bytes()) {
            Ok(env) => Some(env),
            Err(err) => {
                debug!(url = control_url, action, status, error = %err, "Response is not a SOAP envelope");
                None
            }
        };

        Ok(SoapCallResult {
            status,
            raw_body,
            envelope,
        })
    }

    /// Sends one action and returns its output arguments.
    ///
    /// A UPnP fault, a non-2xx status or a body without the
    /// `<{action}Response>` element are errors.
    pub fn invoke(
        &self,
        control_url: &str,
        service_urn: &str,
        action: &str,
        args: &[(&str, &str)],
    ) -> Result<HashMap<String, String>, SoapError> {
        let result = self.call(control_url, service_urn, action, args)?;

        if let Some(fault) = result.envelope.as_ref().and_then(parse_upnp_fault) {
            return Err(SoapError::from_fault(action, result.status, &fault));
        }

        if !result.is_success() {
            return Err(SoapError::HttpStatus {
                action: action.to_string(),
                status: result.status,
                body: result.raw_body,
            });
        }

        let envelope = result.envelope.ok_or(SoapError::MissingEnvelope)?;
        action_response(&envelope, action)
    }
}
