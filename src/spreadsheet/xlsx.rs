use crate::error::InspectError;
use crate::error::ResultMessage;
use crate::helpers::xml::XmlAttributeHelper;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::excel;
use crate::spreadsheet::excel::is_compound_document;
use crate::spreadsheet::excel::load_relationships;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::reference::row_to_index;
use crate::spreadsheet::reference::MAX_COLS;
use crate::spreadsheet::reference::MAX_ROWS;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::Spreadsheet;
use crate::spreadsheet::SpreadsheetError;
use log::debug;
use log::trace;
use quick_xml::events::Event;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;
use zip::ZipArchive;

// XML local names used by SpreadsheetML parts
const TAG_CUSTOM_FORMATS: &[u8] = b"numFmts"; // Custom number formats container
const TAG_CUSTOM_FORMAT: &[u8] = b"numFmt";   // Individual custom number format
const TAG_FORMAT_INDEXES: &[u8] = b"cellXfs";  // Cell format indexes container
const TAG_FORMAT_INDEX: &[u8] = b"xf";         // Individual cell format index
const TAG_SHARED_STRING_ITEM: &[u8] = b"si";   // Shared string table item
const TAG_PHONETIC_TEXT: &[u8] = b"rPh";       // Phonetic text for Asian languages
const TAG_TEXT: &[u8] = b"t";                  // Text content within strings
const TAG_WORKBOOK_PROPERTIES: &[u8] = b"workbookPr"; // Workbook properties
const TAG_SHEET: &[u8] = b"sheet";             // Sheet definition (worksheet or chartsheet)
const TAG_ROW: &[u8] = b"row";                 // Row in worksheet
const TAG_CELL: &[u8] = b"c";                  // Cell in worksheet
const TAG_INLINE_STRING: &[u8] = b"is";        // Inline string value
const TAG_VALUE: &[u8] = b"v";                 // Cell value content

/// Type alias for buffered file reader
pub(crate) type FileReader = BufReader<File>;

/// Represents an Excel XLSX spreadsheet file
pub(crate) struct XlsxSpreadsheet {
    /// File name of the spreadsheet
    pub(crate) name: String,
    /// ZIP archive containing the XLSX file contents
    zip: ZipArchive<FileReader>,
    /// Parsed number formats for cell type detection, indexed by style id
    number_formats: Vec<CellType>,
    /// All sheets with (name, worksheet zip_path) pairs in workbook order;
    /// sheets without a cell grid have no path
    sheets: Vec<(String, Option<String>)>,
    /// Shared strings table, loaded on first use
    shared_strings: Option<Vec<String>>,
}

impl XlsxSpreadsheet {
    /// Opens an XLSX spreadsheet file and parses its structure
    ///
    /// # Arguments
    /// * `path` - Path to the XLSX file
    ///
    /// # Returns
    /// Result containing the initialized XlsxSpreadsheet or an error
    pub(crate) fn open(path: &Path) -> Result<XlsxSpreadsheet, InspectError> {
        let name = path.display().to_string();
        Self::open_package(path, &name).with_prefix(&format!("Cannot open '{}'", name))
    }

    fn open_package(path: &Path, name: &str) -> Result<XlsxSpreadsheet, InspectError> {
        let mut reader = BufReader::new(File::open(path)?);
        if is_compound_document(&mut reader)? {
            Err(SpreadsheetError::CompoundDocument(name.to_owned()))?;
        }

        let mut zip = ZipArchive::new(reader)?;
        let (sheets, is_1904) = load_workbook(&mut zip)?;
        let number_formats = load_number_formats(&mut zip, is_1904)?;
        debug!("opened '{}': {} sheets, {} cell formats, 1904 epoch: {}", name, sheets.len(), number_formats.len(), is_1904);

        Ok(XlsxSpreadsheet {
            name: name.to_owned(),
            zip,
            number_formats,
            sheets,
            shared_strings: None,
        })
    }
}

impl Spreadsheet for XlsxSpreadsheet {
    fn name(&self) -> String {
        self.name.to_owned()
    }

    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.to_owned()).collect()
    }

    /// Loads shared strings from the XLSX file
    ///
    /// Shared strings are stored in a separate XML part and referenced by index
    /// to reduce file size when the same string appears multiple times.
    fn load_shared_strings(&mut self) -> Result<Vec<String>, InspectError> {
        if let Some(shared_strings) = &self.shared_strings {
            return Ok(shared_strings.clone());
        }

        let mut shared_strings = Vec::<String>::new();
        if let Some(mut reader) = self.zip.xml_reader("xl/sharedStrings.xml")? {
            match_xml_events!(reader => {
                Event::Start(event) if event.local_name().as_ref() == TAG_SHARED_STRING_ITEM => {
                    let string = read_string_value(&mut reader, TAG_SHARED_STRING_ITEM, false)?;
                    shared_strings.push(string);
                }
            });
        }
        debug!("loaded {} shared strings from '{}'", shared_strings.len(), self.name);

        self.shared_strings = Some(shared_strings.clone());
        Ok(shared_strings)
    }

    /// Reads a worksheet from the XLSX file
    ///
    /// Parses the worksheet XML part and collects every cell that carries a value.
    /// Cells without an `r` attribute continue from the previous position.
    fn read_sheet(&mut self, sheet_name: &str) -> Result<Sheet, InspectError> {
        let zip_path = self.sheets.iter()
            .find(|(name, _)| name == sheet_name)
            .map(|(_, zip_path)| zip_path.to_owned())
            .ok_or_else(|| SpreadsheetError::SheetNotFound(sheet_name.to_owned()))?
            .ok_or_else(|| SpreadsheetError::NotAWorksheet(sheet_name.to_owned()))?;

        let mut sheet = Sheet::new(sheet_name);
        let mut row_count = 0usize;
        let mut col_count = 0usize;
        let mut row = 0usize;
        let mut col = 0usize;
        let mut kind = CellType::default();
        let mut value = String::new();
        let mut reader = self.zip.xml_reader(&zip_path)?
            .ok_or_else(|| SpreadsheetError::MissingPart(zip_path.to_owned()))?;
        match_xml_events!(reader => {
            Event::Start(event) if event.local_name().as_ref() == TAG_ROW => {
                if let Some(number) = event.get_attribute_value("r")? {
                    row_count = row_to_index(&number).ok_or_else(|| SpreadsheetError::InvalidCellValue {
                        position: format!("row {}", number),
                        message: "row number outside 1..1048576".to_owned(),
                    })?;
                }
                col_count = 0;
            }
            Event::End(event) if event.local_name().as_ref() == TAG_ROW => {
                row_count += 1;
            }
            Event::Start(event) if event.local_name().as_ref() == TAG_CELL => {
                (row, col) = match event.get_attribute_value("r")? {
                    Some(reference) => reference_to_index(&reference).ok_or_else(|| SpreadsheetError::InvalidCellValue {
                        position: reference.to_string(),
                        message: "cell reference outside A1:XFD1048576".to_owned(),
                    })?,
                    None if row_count < MAX_ROWS && col_count < MAX_COLS => (row_count, col_count),
                    None => Err(SpreadsheetError::InvalidCellValue {
                        position: index_to_reference(row_count, col_count),
                        message: "cell position outside A1:XFD1048576".to_owned(),
                    })?,
                };
                row_count = row;
                col_count = col + 1;
                value.clear();
                kind = event.get_attribute_value("t")?.map(|t| {
                    match t.as_ref() {
                        "inlineStr" | "str" => CellType::InlineString,
                        "s" => CellType::SharedString,
                        "d" => CellType::IsoDateTime,
                        "b" => CellType::Boolean,
                        "e" => CellType::Error,
                        _ => CellType::Number,
                    }
                }).unwrap_or(CellType::Number);
                if let Some(format_id) = event.get_attribute_value("s")? {
                    if kind == CellType::Number && !format_id.is_empty() {
                        let index = format_id.parse::<usize>()?;
                        kind = self.number_formats.get(index).copied().unwrap_or(CellType::Number);
                    }
                }
            }
            Event::Start(event) if kind != CellType::Empty && event.local_name().as_ref() == TAG_INLINE_STRING => {
                value = read_string_value(&mut reader, TAG_INLINE_STRING, false)?;
            }
            Event::Start(event) if kind != CellType::Empty && event.local_name().as_ref() == TAG_VALUE => {
                value = read_string_value(&mut reader, TAG_VALUE, true)?;
            }
            Event::End(event) if event.local_name().as_ref() == TAG_CELL => {
                if kind != CellType::Empty && !value.is_empty() {
                    sheet.push(Cell {
                        row,
                        col,
                        kind,
                        value: std::mem::take(&mut value),
                    });
                }
                kind = CellType::Empty;
            },
        });
        trace!("read {} cells from sheet '{}' ({})", sheet.cells.len(), sheet.name, zip_path);

        Ok(sheet)
    }
}

/// Loads workbook structure and worksheet information from XLSX file
///
/// Parses the workbook.xml file to extract sheet names and the XML file paths of
/// worksheets, and determines the date system (1900 vs 1904) used in the file.
///
/// # Returns
/// Tuple of (sheets, is_1904_date_system) where sheets are (name, zip_path) pairs and
/// chartsheets or sheets without a relationship have no path
fn load_workbook(zip: &mut ZipArchive<FileReader>) -> Result<(Vec<(String, Option<String>)>, bool), InspectError> {
    let relationships = load_relationships(zip, "xl/_rels/workbook.xml.rels")?;
    let mut reader = zip.xml_reader("xl/workbook.xml")?
        .ok_or_else(|| SpreadsheetError::MissingPart("xl/workbook.xml".to_string()))?;
    let mut sheets: Vec<(String, Option<String>)> = Vec::new();
    let mut is_1904 = false;
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_SHEET => {
            let mut name = None::<String>;
            let mut id = None::<String>;
            for result in event.attributes() {
                let attribute = result?;
                let key = attribute.key.local_name();
                if key.as_ref() == b"name" {
                    name = Some(attribute.get_value()?.to_string());
                } else if key.as_ref() == b"id" {
                    id = Some(attribute.get_value()?.to_string());
                }
            }
            if let Some((name, id)) = name.zip(id) {
                let zip_path = relationships.get(&id)
                    .filter(|relationship| relationship.is_worksheet)
                    .map(|relationship| relationship.path.to_owned());
                if zip_path.is_none() {
                    debug!("sheet '{}' ({}) has no cell grid", name, id);
                }
                sheets.push((name, zip_path));
            }
        }
        Event::Start(event) if event.local_name().as_ref() == TAG_WORKBOOK_PROPERTIES => {
            is_1904 = event.get_attribute_value("date1904")?
                .map(|value| value.eq("1") || value.eq("true"))
                .unwrap_or(false);
        }
    });
    Ok((sheets, is_1904))
}

/// Loads number formats and cell styles from XLSX styles.xml file
///
/// Parses custom number formats and cell style indexes to determine
/// which numeric cells hold dates and times.
///
/// # Returns
/// Vector of CellType values indexed by style ID
fn load_number_formats(zip: &mut ZipArchive<FileReader>, is_1904: bool) -> Result<Vec<CellType>, InspectError> {
    let mut reader = match zip.xml_reader("xl/styles.xml")? {
        Some(reader) => reader,
        None => return Ok(Vec::new()),
    };

    let mut custom_formats_context = false;
    let mut custom_formats = HashMap::<String, CellType>::new();

    let mut format_indexes_context = false;
    let mut format_indexes = Vec::<String>::new();

    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_CUSTOM_FORMATS => custom_formats_context = true,
        Event::End(event) if event.local_name().as_ref() == TAG_CUSTOM_FORMATS => custom_formats_context = false,
        Event::Start(event) if custom_formats_context && event.local_name().as_ref() == TAG_CUSTOM_FORMAT => {
            let id = event.get_attribute_value("numFmtId")?;
            let format = event.get_attribute_value("formatCode")?;
            if let Some((id, format)) = id.zip(format) {
                let style = CellType::parse_custom_number_format(&format, is_1904);
                custom_formats.insert(id.to_string(), style);
            }
        }

        Event::Start(event) if event.local_name().as_ref() == TAG_FORMAT_INDEXES => format_indexes_context = true,
        Event::End(event) if event.local_name().as_ref() == TAG_FORMAT_INDEXES => format_indexes_context = false,
        Event::Start(event) if format_indexes_context && event.local_name().as_ref() == TAG_FORMAT_INDEX => {
            let id = event.get_attribute_value("numFmtId")?;
            format_indexes.push(id.map(|id| id.to_string()).unwrap_or_else(|| "0".to_owned()));
        }
    });

    Ok(excel::load_number_formats(format_indexes, custom_formats, is_1904))
}

/// Reads string value from XML content, handling text and CDATA sections
///
/// Extracts string content from XML elements, skipping phonetic text annotations
/// and concatenating rich text runs.
///
/// # Arguments
/// * `reader` - XML reader positioned just after the opening tag
/// * `end_tag` - local name of the element that closes the string content
/// * `is_text_content` - Whether to treat the content as text without a `<t>` wrapper
fn read_string_value<R: BufRead>(
    reader: &mut XmlReader<R>,
    end_tag: &[u8],
    is_text_content: bool,
) -> Result<String, InspectError> {
    let mut is_phonetic_text = false;
    let mut is_text = is_text_content;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.local_name().as_ref() == end_tag => break,
        Event::Start(event) if event.local_name().as_ref() == TAG_PHONETIC_TEXT => is_phonetic_text = true,
        Event::End(event) if event.local_name().as_ref() == TAG_PHONETIC_TEXT => is_phonetic_text = false,
        Event::Start(event) if !is_phonetic_text && event.local_name().as_ref() == TAG_TEXT => is_text = true,
        Event::End(event) if is_text && event.local_name().as_ref() == TAG_TEXT => is_text = false,
        Event::Text(event) if is_text => text.push_str(&event.xml_content()?),
        Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if is_text => text.push_bytes_ref(&event)?,
    });
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read(xml: &str, end_tag: &[u8], is_text_content: bool) -> String {
        let mut reader = XmlReader::new(Cursor::new(xml.as_bytes().to_vec()));
        read_string_value(&mut reader, end_tag, is_text_content).unwrap()
    }

    #[test]
    fn rich_text_runs_are_concatenated() {
        let xml = "<r><rPr><b/></rPr><t>Hello</t></r><r><t xml:space=\"preserve\"> world</t></r></si>";
        assert_eq!(read(xml, TAG_SHARED_STRING_ITEM, false), "Hello world");
    }

    #[test]
    fn phonetic_runs_are_skipped() {
        let xml = "<t>漢字</t><rPh sb=\"0\" eb=\"2\"><t>かんじ</t></rPh></si>";
        assert_eq!(read(xml, TAG_SHARED_STRING_ITEM, false), "漢字");
    }

    #[test]
    fn value_text_and_entities() {
        assert_eq!(read("3.5</v>", TAG_VALUE, true), "3.5");
        assert_eq!(read("<t>R&amp;D</t></is>", TAG_INLINE_STRING, false), "R&D");
    }
}
