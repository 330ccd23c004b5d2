//! Office Open XML package helpers
use crate::error::InspectError;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use std::collections::HashMap;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use zip::ZipArchive;

/// XML tag name for relationship elements
const TAG_RELATIONSHIP: &[u8] = b"Relationship";

/// Signature of OLE compound documents (encrypted OOXML packages and legacy .xls files)
const OLE_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Relationship type suffix of worksheet parts
const WORKSHEET_RELATIONSHIP: &str = "/worksheet";

/// Target of a workbook relationship
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Relationship {
    /// Path of the target part within the archive
    pub(super) path: String,
    /// Whether the target is a worksheet with a cell grid
    pub(super) is_worksheet: bool,
}

/// Loads relationships from a package relationships part
///
/// # Arguments
/// * `zip` - Zip archive handle
/// * `path` - Path to the relationships XML file within the archive
///
/// # Returns
/// Mapping of relationship IDs to their targets; a missing `Type` counts as a worksheet
pub(super) fn load_relationships<RS: Read + Seek>(zip: &mut ZipArchive<RS>, path: &str) -> Result<HashMap<String, Relationship>, InspectError> {
    let mut reader = zip.xml_reader(path)?
        .ok_or_else(|| SpreadsheetError::MissingPart(path.to_string()))?;
    let mut relationships: HashMap<String, Relationship> = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.get_attribute_value("Id")?;
            let kind = event.get_attribute_value("Type")?;
            let target = event.get_attribute_value("Target")?;
            if let Some((id, target)) = id.zip(target) {
                relationships.insert(id.to_string(), Relationship {
                    path: to_zip_path(&target),
                    is_worksheet: kind.map(|it| it.ends_with(WORKSHEET_RELATIONSHIP)).unwrap_or(true),
                });
            }
        }
    });
    Ok(relationships)
}

/// Maps `cellXfs` format ids to cell types using custom and built-in formats
pub(super) fn load_number_formats(format_indexes: Vec<String>, custom_formats: HashMap<String, CellType>, is_1904: bool) -> Vec<CellType> {
    format_indexes
        .iter()
        .map(|id| {
            custom_formats
                .get(id)
                .copied()
                .or_else(|| CellType::parse_builtin_number_format_id(id, is_1904))
                .unwrap_or(CellType::Number)
        })
        .collect()
}

/// Normalizes a relationship target to a path within the zip archive
pub(crate) fn to_zip_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    if let Some(absolute) = path.strip_prefix('/') {
        absolute.to_string()
    } else if path.starts_with("xl/") {
        path
    } else if let Some(parent) = path.strip_prefix("../") {
        parent.to_string()
    } else {
        format!("xl/{path}")
    }
}

/// Checks whether the file is an OLE compound document rather than a ZIP package.
/// The reader is rewound to the start afterwards.
pub(super) fn is_compound_document<RS: Read + Seek>(reader: &mut RS) -> Result<bool, InspectError> {
    let mut signature = [0u8; 8];
    let mut length = 0usize;
    while length < signature.len() {
        match reader.read(&mut signature[length..])? {
            0 => break,
            count => length += count,
        }
    }
    reader.seek(SeekFrom::Start(0))?;
    Ok(length == signature.len() && signature == OLE_SIGNATURE)
}
