//! SOAP envelope construction

use crate::{SOAP_ENCODING_STYLE, SOAP_ENVELOPE_NS};
use xmltree::{Element, XMLNode};

fn text_element(name: &str, value: &str) -> Element {
    let mut child = Element::new(name);
    child.children.push(XMLNode::Text(value.to_string()));
    child
}

pub(crate) fn write_envelope(body_child: Element) -> Result<String, xmltree::Error> {
    let mut body = Element::new("s:Body");
    body.children.push(XMLNode::Element(body_child));

    let mut envelope = Element::new("s:Envelope");
    envelope
        .attributes
        .insert("xmlns:s".to_string(), SOAP_ENVELOPE_NS.to_string());
    envelope
        .attributes
        .insert("s:encodingStyle".to_string(), SOAP_ENCODING_STYLE.to_string());
    envelope.children.push(XMLNode::Element(body));

    let mut buf = Vec::new();
    let config = xmltree::EmitterConfig::new()
        .write_document_declaration(true)
        .perform_indent(true)
        .indent_string("  ");
    envelope.write_with_config(&mut buf, config)?;

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn action_element(service_urn: &str, name: &str, args: &[(&str, &str)]) -> Element {
    let mut elem = Element::new(&format!("u:{name}"));
    elem.attributes
        .insert("xmlns:u".to_string(), service_urn.to_string());
    for (arg, value) in args {
        elem.children
            .push(XMLNode::Element(text_element(arg, value)));
    }
    elem
}

/// Builds the envelope of a UPnP action request.
///
/// Arguments are emitted in the given order, which UPnP requires to match
/// the service description.
pub fn build_soap_request(
    service_urn: &str,
    action: &str,
    args: &[(&str, &str)],
) -> Result<String, xmltree::Error> {
    write_envelope(action_element(service_urn, action, args))
}

/// Builds the envelope of a UPnP action response (`<u:{action}Response>`).
pub fn build_soap_response(
    service_urn: &str,
    action: &str,
    values: &[(&str, &str)],
) -> Result<String, xmltree::Error> {
    write_envelope(action_element(
        service_urn,
        &format!("{action}Response"),
        values,
    ))
}
