//! SOAP envelope structures

use xmltree::Element;

/// A decoded SOAP envelope.
#[derive(Debug, Clone)]
pub struct SoapEnvelope {
    pub header: Option<SoapHeader>,
    pub body: SoapBody,
}

#[derive(Debug, Clone)]
pub struct SoapHeader {
    /// Raw XML of the header element
    pub content: Element,
}

#[derive(Debug, Clone)]
pub struct SoapBody {
    /// Raw XML of the body element
    pub content: Element,
}

impl SoapEnvelope {
    pub fn new(body: SoapBody) -> Self {
        Self { header: None, body }
    }
}
