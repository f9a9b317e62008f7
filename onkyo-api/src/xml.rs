//! XML payloads embedded in NRI and NLA messages
//!
//! Both documents are wrapped in a `<response status="...">` element. Only the
//! fields the reconciliation layer needs are modelled; everything else in the
//! document is ignored.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, Result};
use crate::types::InputSelector;

/// Parse an XML document into a deserializable type
pub fn parse<T: DeserializeOwned>(xml: &str) -> Result<T> {
    quick_xml::de::from_str(xml.trim()).map_err(|e| ProtocolError::Xml(e.to_string()))
}

fn ensure_ok(status: Option<&str>) -> Result<()> {
    match status {
        None | Some("ok") => Ok(()),
        Some(other) => Err(ProtocolError::Xml(format!("response status {:?}", other))),
    }
}

// ============================================================================
// Receiver information (NRI)
// ============================================================================

#[derive(Debug, Deserialize)]
struct DeviceResponse {
    #[serde(rename = "@status", default)]
    status: Option<String>,
    device: DeviceElement,
}

#[derive(Debug, Deserialize)]
struct DeviceElement {
    #[serde(rename = "@id", default)]
    id: String,
    #[serde(default)]
    brand: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    year: String,
    #[serde(default)]
    model: String,
    #[serde(default)]
    firmwareversion: String,
    #[serde(default)]
    friendlyname: Option<String>,
    #[serde(default)]
    selectorlist: Option<SelectorListElement>,
}

#[derive(Debug, Default, Deserialize)]
struct SelectorListElement {
    #[serde(rename = "selector", default)]
    selectors: Vec<SelectorElement>,
}

#[derive(Debug, Deserialize)]
struct SelectorElement {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@name", default)]
    name: String,
    #[serde(rename = "@value", default)]
    value: Option<String>,
}

/// One input the receiver advertises in its NRI selector list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selector {
    pub selector: InputSelector,
    pub name: String,
    pub enabled: bool,
}

/// Device identity and capabilities from NRI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiverInformation {
    pub device_id: String,
    pub brand: String,
    pub category: String,
    pub year: String,
    pub model: String,
    pub firmware: String,
    pub friendly_name: Option<String>,
    pub selectors: Vec<Selector>,
}

impl ReceiverInformation {
    /// Parse an NRI document
    ///
    /// Selectors with an id that is not a hex code are skipped.
    pub fn parse(xml: &str) -> Result<Self> {
        let response: DeviceResponse = parse(xml)?;
        ensure_ok(response.status.as_deref())?;
        let device = response.device;

        let selectors = device
            .selectorlist
            .unwrap_or_default()
            .selectors
            .into_iter()
            .filter_map(|s| {
                Some(Selector {
                    selector: InputSelector::from_code(&s.id)?,
                    name: s.name.trim().to_string(),
                    enabled: s.value.as_deref() != Some("0"),
                })
            })
            .collect();

        Ok(Self {
            device_id: device.id,
            brand: device.brand.trim().to_string(),
            category: device.category.trim().to_string(),
            year: device.year.trim().to_string(),
            model: device.model.trim().to_string(),
            firmware: device.firmwareversion.trim().to_string(),
            friendly_name: device
                .friendlyname
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            selectors,
        })
    }
}

// ============================================================================
// XML list (NLA)
// ============================================================================

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(rename = "@status", default)]
    status: Option<String>,
    items: ItemsElement,
}

#[derive(Debug, Deserialize)]
struct ItemsElement {
    #[serde(rename = "@offset", default)]
    offset: Option<u32>,
    #[serde(rename = "@totalitems", default)]
    total_items: Option<u32>,
    #[serde(rename = "item", default)]
    items: Vec<ItemElement>,
}

#[derive(Debug, Deserialize)]
struct ItemElement {
    #[serde(rename = "@iconid", default)]
    icon_id: String,
    #[serde(rename = "@title", default)]
    title: String,
    #[serde(rename = "@selectable", default)]
    selectable: Option<String>,
}

/// One entry of a structured media listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlListItem {
    /// Position in the full listing (offset + index in this page)
    pub index: u32,
    pub icon_id: String,
    pub title: String,
    pub selectable: bool,
}

/// A page of a structured media listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlList {
    pub offset: u32,
    pub total_items: u32,
    pub items: Vec<XmlListItem>,
}

impl XmlList {
    pub fn parse(xml: &str) -> Result<Self> {
        let response: ListResponse = parse(xml)?;
        ensure_ok(response.status.as_deref())?;

        let offset = response.items.offset.unwrap_or(0);
        let items: Vec<XmlListItem> = response
            .items
            .items
            .into_iter()
            .enumerate()
            .map(|(i, item)| XmlListItem {
                index: offset + i as u32,
                icon_id: item.icon_id,
                title: item.title,
                selectable: item.selectable.as_deref() != Some("0"),
            })
            .collect();

        Ok(Self {
            offset,
            total_items: response.items.total_items.unwrap_or(items.len() as u32),
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NRI: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<response status="ok">
  <device id="TX-NR676">
    <brand>ONKYO</brand>
    <category>AV Receiver</category>
    <year>2016</year>
    <model>TX-NR676E</model>
    <destination>DX</destination>
    <firmwareversion>1100-4100-0000-0021</firmwareversion>
    <friendlyname>Living Room</friendlyname>
    <selectorlist count="3">
      <selector id="2B" value="1" name="NET" zone="01" iconid="2B"/>
      <selector id="29" value="1" name="USB(Front)" zone="01" iconid="29"/>
      <selector id="24" value="0" name="FM" zone="01" iconid="24"/>
    </selectorlist>
  </device>
</response>"#;

    #[test]
    fn test_receiver_information() {
        let info = ReceiverInformation::parse(NRI).unwrap();
        assert_eq!(info.device_id, "TX-NR676");
        assert_eq!(info.brand, "ONKYO");
        assert_eq!(info.model, "TX-NR676E");
        assert_eq!(info.year, "2016");
        assert_eq!(info.firmware, "1100-4100-0000-0021");
        assert_eq!(info.friendly_name.as_deref(), Some("Living Room"));
        assert_eq!(info.selectors.len(), 3);
        assert_eq!(info.selectors[1].selector, InputSelector::UsbFront);
        assert!(!info.selectors[2].enabled);
    }

    #[test]
    fn test_receiver_information_malformed() {
        assert!(ReceiverInformation::parse("<response status=\"ok\"><device").is_err());
        assert!(ReceiverInformation::parse("").is_err());
    }

    #[test]
    fn test_receiver_information_failed_status() {
        let xml = r#"<response status="fail"><device id="x"/></response>"#;
        assert!(ReceiverInformation::parse(xml).is_err());
    }

    #[test]
    fn test_xml_list() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<response status="ok">
  <items offset="2" totalitems="10">
    <item iconid="29" title="Music" url="" selectable="1"/>
    <item iconid="2D" title="Readme.txt" url="" selectable="0"/>
  </items>
</response>"#;
        let list = XmlList::parse(xml).unwrap();
        assert_eq!(list.offset, 2);
        assert_eq!(list.total_items, 10);
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items[0].index, 2);
        assert_eq!(list.items[0].title, "Music");
        assert!(list.items[0].selectable);
        assert!(!list.items[1].selectable);
    }

    #[test]
    fn test_xml_list_empty_items() {
        let xml = r#"<response status="ok"><items offset="0" totalitems="0"></items></response>"#;
        let list = XmlList::parse(xml).unwrap();
        assert!(list.items.is_empty());
        assert_eq!(list.total_items, 0);
    }
}
