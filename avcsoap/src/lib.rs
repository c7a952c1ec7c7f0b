//! # avcsoap - SOAP plumbing for UPnP control points
//!
//! Builds UPnP action requests, decodes the response envelopes and the
//! `UPnPError` faults renderers send back, and carries the blocking HTTP
//! transport used to reach a service control URL.
//!
//! ## Example
//!
//! ```no_run
//! use avcsoap::SoapClient;
//! use std::time::Duration;
//!
//! let client = SoapClient::new(Duration::from_secs(5));
//! let values = client.invoke(
//!     "http://192.168.1.20:49152/upnp/control/AVTransport1",
//!     "urn:schemas-upnp-org:service:AVTransport:1",
//!     "GetTransportInfo",
//!     &[("InstanceID", "0")],
//! )?;
//! println!("{:?}", values.get("CurrentTransportState"));
//! # Ok::<(), avcsoap::SoapError>(())
//! ```

mod builder;
mod client;
mod envelope;
mod error;
mod fault;
mod parser;

pub use builder::{build_soap_request, build_soap_response};
pub use client::{SoapCallResult, SoapClient};
pub use envelope::{SoapBody, SoapEnvelope, SoapHeader};
pub use error::SoapError;
pub use fault::{SoapFault, UpnpError, build_soap_fault, parse_upnp_fault};
pub use parser::{action_response, find_child_with_suffix, parse_soap_envelope};

/// Namespace of the SOAP 1.1 envelope.
pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Encoding style required by UPnP on every envelope.
pub const SOAP_ENCODING_STYLE: &str = "http://schemas.xmlsoap.org/soap/encoding/";

/// AVTransport error codes the control point reacts to.
pub mod error_codes {
    /// The requested transition is not allowed in the current state.
    pub const TRANSITION_NOT_AVAILABLE: u32 = 701;
    /// The resource format is not supported.
    pub const ILLEGAL_MIME_TYPE: u32 = 714;
}
