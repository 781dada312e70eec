use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use xmltree::{Element, EmitterConfig, Namespace, XMLNode};

use crate::metadata::MetadataRecord;
use crate::values::{AnnotatedValue, split_multivalue};

pub const PBCORE_NS: &str = "http://www.pbcore.org/PBCore/PBCoreNamespace.html";
pub const OHMS_NS: &str = "https://www.weareavp.com/nunncenter/ohms";
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Prefix bindings declared once on the document root.
const NAMESPACES: [(&str, &str); 3] = [
    ("pbcore", PBCORE_NS),
    ("ohms", OHMS_NS),
    ("xml", XML_NS),
];

/// Contributor roles, in the order their blocks appear in the document.
const CONTRIBUTOR_ROLES: [&str; 5] = ["interviewer", "interviewee", "host", "speaker", "performer"];

/// Subject passes: record field -> subjectType attribute value.
const SUBJECT_FIELDS: [(&str, &str); 4] = [
    ("topics", "topic"),
    ("names", "name"),
    ("events", "period"),
    ("places", "geographic"),
];

/// Sibling path with the last extension replaced by `suffix`, e.g.
/// `tape.wav` + `_pbcore.xml` -> `tape_pbcore.xml`.
pub fn derived_path(infile: &Path, suffix: &str) -> PathBuf {
    let mut name = infile
        .file_stem()
        .unwrap_or(infile.as_os_str())
        .to_os_string();
    name.push(suffix);
    infile.with_file_name(name)
}

fn pbcore_element(name: &str) -> Element {
    let mut element = Element::new(name);
    element.prefix = Some("pbcore".to_string());
    element.namespace = Some(PBCORE_NS.to_string());
    element
}

fn leaf(name: &str, text: &str, attributes: &[(&str, &str)]) -> Element {
    let mut element = pbcore_element(name);
    if !text.is_empty() {
        element.children.push(XMLNode::Text(text.to_string()));
    }
    for (key, value) in attributes {
        element
            .attributes
            .insert((*key).to_string(), (*value).to_string());
    }
    element
}

/// Appends `<name>text</name>`, skipping the element entirely when the text
/// is empty.
fn add_child(parent: &mut Element, name: &str, text: &str, attributes: &[(&str, &str)]) {
    if text.is_empty() {
        return;
    }
    parent.children.push(XMLNode::Element(leaf(name, text, attributes)));
}

/// Element for one multivalue item; sourced items carry their wikidata
/// attributes ahead of any per-pass attributes.
fn annotated_leaf(name: &str, item: &AnnotatedValue, attributes: &[(&str, &str)]) -> Element {
    let mut element = match item.wikidata_url() {
        Some(url) => leaf(name, item.name(), &[("source", "wikidata"), ("ref", &url)]),
        None => leaf(name, item.name(), &[]),
    };
    for (key, value) in attributes {
        element
            .attributes
            .insert((*key).to_string(), (*value).to_string());
    }
    element
}

/// One element per `;`-delimited item of `value`; nothing for an empty field.
fn add_multivalue_children(parent: &mut Element, name: &str, value: &str, attributes: &[(&str, &str)]) {
    for item in split_multivalue(value) {
        parent
            .children
            .push(XMLNode::Element(annotated_leaf(name, &item, attributes)));
    }
}

/// Contributor blocks in fixed role order. Every item of a role's field gets
/// its own `pbcoreContributor` with the literal role name as the second child.
fn add_contributors(root: &mut Element, record: &MetadataRecord) {
    for role in CONTRIBUTOR_ROLES {
        for item in split_multivalue(record.get(role)) {
            let mut block = pbcore_element("pbcoreContributor");
            block
                .children
                .push(XMLNode::Element(annotated_leaf("contributor", &item, &[])));
            block
                .children
                .push(XMLNode::Element(leaf("contributorRole", role, &[])));
            root.children.push(XMLNode::Element(block));
        }
    }
}

/// Builds one `pbcoreDescriptionDocument` tree from a metadata record.
///
/// `infile` is the source audio path, used for the provenance comments and
/// `instantiationLocation`. `ohms_root` is the already-parsed root of a
/// companion OHMS document; when present it is embedded verbatim inside the
/// instantiation as `instantiationExtension/extensionEmbedded/<root>`.
///
/// Element order is fixed; any scalar or multivalue step whose source field
/// is empty is simply omitted, never reordered.
pub fn build_document(record: &MetadataRecord, infile: &Path, ohms_root: Option<Element>) -> Element {
    let mut root = pbcore_element("pbcoreDescriptionDocument");
    let mut namespaces = Namespace::empty();
    for (prefix, uri) in NAMESPACES {
        namespaces.put(prefix, uri);
    }
    root.namespaces = Some(namespaces);

    root.children.push(XMLNode::Comment(
        "Automatically generated by bwf2pbcore. DO NOT EDIT BY HAND.".to_string(),
    ));
    root.children.push(XMLNode::Comment(format!(
        "To make changes, edit the internal metadata in {}",
        infile.display()
    )));
    root.children
        .push(XMLNode::Comment("and re-run bwf2pbcore".to_string()));

    add_child(&mut root, "pbcoreAssetType", record.get("form"), &[]);
    add_child(&mut root, "pbcoreAssetDate", record.get("ICRD"), &[]);
    add_child(
        &mut root,
        "pbcoreIdentifier",
        record.get("FileContent"),
        &[("source", "local")],
    );
    add_child(&mut root, "pbcoreTitle", record.get("INAM"), &[]);

    for (field, subject_type) in SUBJECT_FIELDS {
        add_multivalue_children(
            &mut root,
            "pbcoreSubject",
            record.get(field),
            &[("subjectType", subject_type)],
        );
    }

    add_child(&mut root, "pbcoreDescription", record.get("xmp_description"), &[]);

    add_contributors(&mut root, record);

    if !record.get("owner").is_empty() {
        let mut publisher = pbcore_element("pbcorePublisher");
        add_child(&mut publisher, "publisher", record.get("owner"), &[]);
        add_child(&mut publisher, "publisherRole", "copyright holder", &[]);
        root.children.push(XMLNode::Element(publisher));
    }

    let mut rights = pbcore_element("pbcoreRightsSummary");
    rights
        .children
        .push(XMLNode::Element(leaf("rightsSummary", record.get("ICOP"), &[])));
    root.children.push(XMLNode::Element(rights));

    let mut instantiation = pbcore_element("pbcoreInstantiation");
    add_child(
        &mut instantiation,
        "instantiationIdentifier",
        record.get("OriginatorReference"),
        &[("source", "local")],
    );
    add_child(
        &mut instantiation,
        "instantiationLocation",
        &infile.display().to_string(),
        &[],
    );
    // duration truncated at the first '.' to drop fractional seconds
    let duration = record.get("Duration").split('.').next().unwrap_or("");
    add_child(&mut instantiation, "instantiationDuration", duration, &[]);
    // every whitespace character goes, not just the ends: "en - US" -> "en-US"
    let language: String = record.get("language").split_whitespace().collect();
    add_child(&mut instantiation, "instantiationLanguage", &language, &[]);

    if let Some(embedded_root) = ohms_root {
        let mut extension = pbcore_element("instantiationExtension");
        let mut embedded = pbcore_element("extensionEmbedded");
        embedded.children.push(XMLNode::Element(embedded_root));
        extension.children.push(XMLNode::Element(embedded));
        instantiation.children.push(XMLNode::Element(extension));
    }
    root.children.push(XMLNode::Element(instantiation));

    add_child(
        &mut root,
        "pbcoreAnnotation",
        record.get("ISRC"),
        &[("annotationType", "source collection")],
    );

    root
}

/// Serializes the whole tree into memory: an XML declaration, UTF-8, indented.
/// Writing from a buffer means a failed run never leaves a partial file.
pub fn document_to_bytes(root: &Element) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let config = EmitterConfig::new().perform_indent(true);
    root.write_with_config(&mut buffer, config)
        .context("failed to serialize PBCore document")?;
    Ok(buffer)
}

pub fn write_document(root: &Element, outfile: &Path) -> Result<()> {
    let bytes = document_to_bytes(root)?;
    fs::write(outfile, bytes)
        .with_context(|| format!("failed to write {}", outfile.display()))?;
    Ok(())
}
