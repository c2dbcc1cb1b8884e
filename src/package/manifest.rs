use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Element holding the package fields
pub const ROOT_ELEMENT: &str = "package";

pub const TAG_PACKAGE_ID: &str = "PackageId";
pub const TAG_PACKAGE_NAME: &str = "PackageName";
pub const TAG_PACKAGE_DESCRIPTION: &str = "PackageDescription";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed manifest: {0}")]
    Malformed(#[from] roxmltree::Error),

    #[error("ambiguous manifest: found {count} <{tag}> elements, expected at most one")]
    Ambiguous { tag: &'static str, count: usize },
}

/// Identity of an import package as shown to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageInfo {
    pub package_id: String,
    pub name: String,
    pub description: String,
}

/// Read a manifest file, falling back to `fallback_name` for absent fields
pub fn parse_manifest(path: &Path, fallback_name: &str) -> Result<PackageInfo, ManifestError> {
    let text = fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_manifest_str(&text, fallback_name)
}

pub fn parse_manifest_str(xml: &str, fallback_name: &str) -> Result<PackageInfo, ManifestError> {
    let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
    let doc = Document::parse(xml)?;

    let field = |tag: &'static str| -> Result<String, ManifestError> {
        Ok(tag_value(&doc, tag)?.unwrap_or_else(|| fallback_name.to_string()))
    };

    Ok(PackageInfo {
        package_id: field(TAG_PACKAGE_ID)?,
        name: field(TAG_PACKAGE_NAME)?,
        description: field(TAG_PACKAGE_DESCRIPTION)?,
    })
}

/// Text of the single `tag` child across all package elements
fn tag_value(doc: &Document<'_>, tag: &'static str) -> Result<Option<String>, ManifestError> {
    let matches: Vec<Node<'_, '_>> = doc
        .descendants()
        .filter(|node| node.has_tag_name(ROOT_ELEMENT))
        .flat_map(move |package| package.children().filter(move |child| child.has_tag_name(tag)))
        .collect();

    match matches.as_slice() {
        [] => Ok(None),
        [node] => Ok(text_content(*node)),
        _ => Err(ManifestError::Ambiguous {
            tag,
            count: matches.len(),
        }),
    }
}

fn text_content(node: Node<'_, '_>) -> Option<String> {
    let text: String = node
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
