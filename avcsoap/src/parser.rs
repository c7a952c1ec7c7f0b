//! Decoding of SOAP envelopes and action responses

use crate::{SoapBody, SoapEnvelope, SoapError, SoapHeader};
use std::collections::HashMap;
use std::io::BufReader;
use xmltree::{Element, XMLNode};

/// Parses a complete SOAP envelope. The header is optional, the body is not.
pub fn parse_soap_envelope(xml: &[u8]) -> Result<SoapEnvelope, SoapError> {
    let root = Element::parse(BufReader::new(xml))?;

    if !root.name.ends_with("Envelope") {
        return Err(SoapError::MissingEnvelope);
    }

    let header = find_child_with_suffix(&root, "Header").map(|e| SoapHeader { content: e.clone() });

    let body = find_child_with_suffix(&root, "Body")
        .map(|e| SoapBody { content: e.clone() })
        .ok_or(SoapError::MissingBody)?;

    Ok(SoapEnvelope { header, body })
}

/// First direct child element whose name ends with `suffix`.
pub fn find_child_with_suffix<'a>(parent: &'a Element, suffix: &str) -> Option<&'a Element> {
    parent.children.iter().find_map(|node| match node {
        XMLNode::Element(elem) if elem.name.ends_with(suffix) => Some(elem),
        _ => None,
    })
}

/// Extracts the output arguments of `<{action}Response>` as a name to
/// trimmed text map. Empty elements map to an empty string.
pub fn action_response(
    envelope: &SoapEnvelope,
    action: &str,
) -> Result<HashMap<String, String>, SoapError> {
    let response_name = format!("{action}Response");
    let response = find_child_with_suffix(&envelope.body.content, &response_name)
        .ok_or_else(|| SoapError::MissingResponse(action.to_string()))?;

    let mut values = HashMap::new();
    for node in &response.children {
        if let XMLNode::Element(elem) = node {
            let text = elem
                .get_text()
                .map(|t| t.trim().to_string())
                .unwrap_or_default();
            values.insert(elem.name.clone(), text);
        }
    }
    Ok(values)
}
