//! Device description (`description.xml`) retrieval.

use std::io::{BufRead, BufReader};
use std::time::Duration;

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::{Error as XmlError, Reader, events::Event};
use thiserror::Error;
use tracing::debug;
use ureq::Agent;

use crate::model::{DeviceId, RendererInfo, ServiceEndpoint};
use crate::renderer::UpnpRenderer;
use crate::upnp_clients::resolve_control_url;

#[derive(Debug, Error)]
pub enum DescriptionError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] ureq::Error),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Missing required device element: {0}")]
    MissingField(&'static str),
}

#[derive(Debug, Default)]
struct ParsedDescription {
    url_base: Option<String>,
    udn: Option<String>,
    friendly_name: Option<String>,
    manufacturer: Option<String>,
    model_name: Option<String>,
    services: Vec<(String, String, String)>,
}

#[derive(Debug, Default)]
struct ServiceBuilder {
    service_type: Option<String>,
    service_id: Option<String>,
    control_url: Option<String>,
}

/// Parses a device description. Identity fields come from the first device
/// that declares them (the root device); services are collected from the
/// root device and all its embedded devices.
pub fn parse_description<R: BufRead>(
    input: R,
    location: &str,
) -> Result<RendererInfo, DescriptionError> {
    let mut reader = Reader::from_reader(input);
    let mut buf = Vec::new();

    let mut parsed = ParsedDescription::default();
    let mut device_depth = 0usize;
    let mut service: Option<ServiceBuilder> = None;
    let mut current_tag: Option<String> = None;
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                match name.as_str() {
                    "device" => device_depth += 1,
                    "service" if device_depth > 0 => service = Some(ServiceBuilder::default()),
                    _ => {}
                }
                current_tag = Some(name);
                text.clear();
            }
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                match name.as_str() {
                    "device" => device_depth = device_depth.saturating_sub(1),
                    "service" => {
                        if let Some(ServiceBuilder {
                            service_type: Some(service_type),
                            service_id,
                            control_url: Some(control_url),
                        }) = service.take()
                        {
                            parsed.services.push((
                                service_type,
                                service_id.unwrap_or_default(),
                                control_url,
                            ));
                        }
                    }
                    _ if current_tag.as_deref() == Some(name.as_str()) => {
                        let value = text.trim().to_string();
                        match (name.as_str(), device_depth, service.as_mut()) {
                            ("URLBase", 0, _) => parsed.url_base = Some(value),
                            ("serviceType", _, Some(s)) => s.service_type = Some(value),
                            ("serviceId", _, Some(s)) => s.service_id = Some(value),
                            ("controlURL", _, Some(s)) => s.control_url = Some(value),
                            ("UDN", d, None) if d > 0 => {
                                parsed.udn.get_or_insert(value);
                            }
                            ("friendlyName", d, None) if d > 0 => {
                                parsed.friendly_name.get_or_insert(value);
                            }
                            ("manufacturer", d, None) if d > 0 => {
                                parsed.manufacturer.get_or_insert(value);
                            }
                            ("modelName", d, None) if d > 0 => {
                                parsed.model_name.get_or_insert(value);
                            }
                            _ => {}
                        }
                    }
                    _ => {}
                }
                current_tag = None;
                text.clear();
            }
            Event::Text(e) => {
                if current_tag.is_some() {
                    text.push_str(&e.decode().map_err(XmlError::Encoding)?);
                }
            }
            Event::GeneralRef(e) => {
                if current_tag.is_some() {
                    if let Some(c) = e.resolve_char_ref()? {
                        text.push(c);
                    } else {
                        let entity = e.decode().map_err(XmlError::Encoding)?;
                        if let Some(resolved) = resolve_predefined_entity(&entity) {
                            text.push_str(resolved);
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let udn = parsed
        .udn
        .ok_or(DescriptionError::MissingField("UDN"))?
        .to_ascii_lowercase();
    let base = parsed.url_base.as_deref().unwrap_or(location);

    let services = parsed
        .services
        .into_iter()
        .map(|(service_type, service_id, control_url)| ServiceEndpoint {
            control_url: resolve_control_url(base, &control_url),
            service_type,
            service_id,
        })
        .collect();

    Ok(RendererInfo {
        id: DeviceId(udn.clone()),
        friendly_name: parsed.friendly_name.unwrap_or_else(|| udn.clone()),
        udn,
        model_name: parsed.model_name.unwrap_or_default(),
        manufacturer: parsed.manufacturer.unwrap_or_default(),
        location: location.to_string(),
        services,
    })
}

/// Fetches device descriptions over HTTP.
pub struct HttpDescriptionProvider {
    agent: Agent,
    timeout: Duration,
    instance_id: u32,
}

impl HttpDescriptionProvider {
    pub fn new(timeout: Duration, instance_id: u32) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();

        Self {
            agent: config.into(),
            timeout,
            instance_id,
        }
    }

    /// Fetches and parses the description at `location`.
    pub fn fetch(&self, location: &str) -> Result<RendererInfo, DescriptionError> {
        debug!(location, "Fetching device description");

        let response = self.agent.get(location).call()?;
        let (_parts, body) = response.into_parts();
        let info = parse_description(BufReader::new(body.into_reader()), location)?;

        debug!(
            renderer = %info.udn,
            name = %info.friendly_name,
            services = info.services.len(),
            "Parsed device description"
        );
        Ok(info)
    }

    /// Fetches the description and builds a renderer whose clients share this
    /// provider's timeout.
    pub fn fetch_renderer(&self, location: &str) -> Result<UpnpRenderer, DescriptionError> {
        let info = self.fetch(location)?;
        Ok(UpnpRenderer::new(info, self.timeout, self.instance_id))
    }
}
