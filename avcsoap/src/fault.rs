//! SOAP faults and UPnP errors

use crate::builder::write_envelope;
use crate::parser::find_child_with_suffix;
use crate::SoapEnvelope;
use xmltree::{Element, XMLNode};

/// A `<s:Fault>` found in a response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapFault {
    /// e.g. "s:Client"
    pub fault_code: String,
    /// e.g. "UPnPError"
    pub fault_string: String,
    pub upnp_error: Option<UpnpError>,
}

/// The `<UPnPError>` detail of a fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpnpError {
    pub error_code: u32,
    pub error_description: String,
}

fn child_text(parent: &Element, suffix: &str) -> Option<String> {
    find_child_with_suffix(parent, suffix)
        .and_then(|e| e.get_text())
        .map(|t| t.trim().to_string())
}

/// Extracts the fault carried by an envelope, if its body holds one.
///
/// A `UPnPError` whose `errorCode` is not numeric is dropped, the fault
/// itself is still returned.
pub fn parse_upnp_fault(envelope: &SoapEnvelope) -> Option<SoapFault> {
    let fault = find_child_with_suffix(&envelope.body.content, "Fault")?;

    let upnp_error = find_child_with_suffix(fault, "detail")
        .and_then(|detail| find_child_with_suffix(detail, "UPnPError"))
        .and_then(|err| {
            let error_code = child_text(err, "errorCode")?.parse::<u32>().ok()?;
            let error_description = child_text(err, "errorDescription").unwrap_or_default();
            Some(UpnpError {
                error_code,
                error_description,
            })
        });

    Some(SoapFault {
        fault_code: child_text(fault, "faultcode").unwrap_or_default(),
        fault_string: child_text(fault, "faultstring").unwrap_or_default(),
        upnp_error,
    })
}

/// Builds a fault envelope, as a renderer would send it with HTTP 500.
pub fn build_soap_fault(
    fault_code: &str,
    fault_string: &str,
    upnp_error: Option<(u32, &str)>,
) -> Result<String, xmltree::Error> {
    let mut fault = Element::new("s:Fault");

    let mut code = Element::new("faultcode");
    code.children.push(XMLNode::Text(fault_code.to_string()));
    fault.children.push(XMLNode::Element(code));

    let mut string = Element::new("faultstring");
    string.children.push(XMLNode::Text(fault_string.to_string()));
    fault.children.push(XMLNode::Element(string));

    if let Some((error_code, description)) = upnp_error {
        let mut err = Element::new("UPnPError");
        err.attributes.insert(
            "xmlns".to_string(),
            "urn:schemas-upnp-org:control-1-0".to_string(),
        );

        let mut code = Element::new("errorCode");
        code.children.push(XMLNode::Text(error_code.to_string()));
        err.children.push(XMLNode::Element(code));

        let mut desc = Element::new("errorDescription");
        desc.children.push(XMLNode::Text(description.to_string()));
        err.children.push(XMLNode::Element(desc));

        let mut detail = Element::new("detail");
        detail.children.push(XMLNode::Element(err));
        fault.children.push(XMLNode::Element(detail));
    }

    write_envelope(fault)
}
