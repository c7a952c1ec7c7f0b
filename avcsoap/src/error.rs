use crate::fault::SoapFault;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SoapError {
    #[error("Cannot build SOAP request: {0}")]
    Build(#[from] xmltree::Error),
    #[error("XML parse error: {0}")]
    Xml(#[from] xmltree::ParseError),
    #[error("Missing SOAP Envelope")]
    MissingEnvelope,
    #[error("Missing SOAP Body")]
    MissingBody,
    #[error("HTTP error when calling {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: ureq::Error,
    },
    #[error("{action} returned UPnP error {code}: {description} (HTTP status {status})")]
    Fault {
        action: String,
        code: u32,
        description: String,
        status: u16,
    },
    #[error("{action} failed with HTTP status {status} and body: {body}")]
    HttpStatus {
        action: String,
        status: u16,
        body: String,
    },
    #[error("Missing {0}Response element in SOAP body")]
    MissingResponse(String),
}

impl SoapError {
    pub(crate) fn from_fault(action: &str, status: u16, fault: &SoapFault) -> Self {
        match &fault.upnp_error {
            Some(err) => SoapError::Fault {
                action: action.to_string(),
                code: err.error_code,
                description: err.error_description.clone(),
                status,
            },
            None => SoapError::HttpStatus {
                action: action.to_string(),
                status,
                body: format!("{}: {}", fault.fault_code, fault.fault_string),
            },
        }
    }

    /// UPnP error code carried by the fault, if any.
    pub fn upnp_code(&self) -> Option<u32> {
        match self {
            SoapError::Fault { code, .. } => Some(*code),
            _ => None,
        }
    }
}
