use anyhow::{Context, Result, anyhow};
use xmltree::{Element, XMLNode};

const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
const DC_NS: &str = "http://purl.org/dc/elements/1.1/";

/// Custom descriptive properties carried into the record under their own
/// names. Matched by local name: the custom-property namespace varies between
/// the tools that wrote the packet.
const CUSTOM_FIELDS: [&str; 13] = [
    "form",
    "FileContent",
    "topics",
    "names",
    "events",
    "places",
    "interviewer",
    "interviewee",
    "host",
    "speaker",
    "performer",
    "owner",
    "language",
];

/// Extracts record fields from a raw XMP packet embedded in a BWF file.
///
/// Scans every `rdf:Description` under `rdf:RDF`, both attributes and child
/// elements. `dc:description` maps to the `xmp_description` key; the custom
/// properties above keep their names; everything else is ignored. A packet
/// that does not parse is an error — the file's metadata cannot be trusted.
pub fn collect_fields(raw: &str) -> Result<Vec<(String, String)>> {
    // packets are often padded with trailing whitespace or NULs
    let raw = raw.trim_matches('\0').trim();
    let root = Element::parse(raw.as_bytes()).context("XMP packet is not well-formed XML")?;
    let rdf = find_rdf(&root).ok_or_else(|| anyhow!("XMP packet has no rdf:RDF element"))?;

    let mut fields = Vec::new();
    for description in child_elements(rdf).filter(|el| is_rdf(el, "Description")) {
        for (key, value) in &description.attributes {
            if CUSTOM_FIELDS.contains(&key.as_str()) {
                fields.push((key.clone(), value.clone()));
            }
        }
        for property in child_elements(description) {
            if property.name == "description" && property.namespace.as_deref() == Some(DC_NS) {
                if let Some(value) = property_value(property) {
                    fields.push(("xmp_description".to_string(), value));
                }
            } else if CUSTOM_FIELDS.contains(&property.name.as_str()) {
                if let Some(value) = property_value(property) {
                    fields.push((property.name.clone(), value));
                }
            } else {
                log::debug!("ignoring XMP property {}", property.name);
            }
        }
    }
    Ok(fields)
}

fn child_elements(element: &Element) -> impl Iterator<Item = &Element> {
    element.children.iter().filter_map(XMLNode::as_element)
}

fn is_rdf(element: &Element, name: &str) -> bool {
    element.name == name && element.namespace.as_deref() == Some(RDF_NS)
}

fn find_rdf(element: &Element) -> Option<&Element> {
    if is_rdf(element, "RDF") {
        return Some(element);
    }
    child_elements(element).find_map(find_rdf)
}

/// A property's value is either its own text or, for `rdf:Alt`/`rdf:Bag`/
/// `rdf:Seq` wrapped properties, the texts of its `rdf:li` items joined with
/// `"; "` — which is exactly the multivalue grammar the builder splits on.
fn property_value(property: &Element) -> Option<String> {
    if let Some(text) = property.get_text() {
        let text = text.trim().to_string();
        if !text.is_empty() {
            return Some(text);
        }
    }

    let collection = child_elements(property)
        .find(|el| ["Alt", "Bag", "Seq"].into_iter().any(|name| is_rdf(el, name)))?;
    let items: Vec<String> = child_elements(collection)
        .filter(|el| is_rdf(el, "li"))
        .filter_map(|el| el.get_text())
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(items.join("; "))
    }
}
