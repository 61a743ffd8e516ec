//! Tabular exchange format.
//!
//! A tree is flattened to one row per non-root box, in preorder. The first
//! column is the box id, followed by the fixed columns [`FIXED_COLUMNS`] in
//! that exact order, then one column per attribute key found on any box.
//! Readers accept the fixed columns in any order as long as they occupy the
//! positions right after the id.
//!
//! Structure is carried by an optional `parent_id` column. Tables without it
//! (e.g. produced by external tools) are rebuilt level by level with
//! [`BoxTree::insert_by_type`].

use std::fs::File;
use std::io;
use std::path::Path;

use tracing::{debug, warn};

use crate::attributes::AttrValue;
use crate::box_type::BoxType;
use crate::error::{Result, StructureError};
use crate::geometry::Rect;
use crate::ocr_box::OcrBox;
use crate::tree::BoxTree;

/// Name of the leading index column.
pub const INDEX_COLUMN: &str = "box_id";

/// Columns that follow the index column, in order.
pub const FIXED_COLUMNS: [&str; 8] = [
    "left",
    "top",
    "right",
    "bottom",
    "conf",
    "text",
    "has_children",
    "box_type",
];

/// Reserved column holding the id of each row's parent (empty for children
/// of the root).
pub const PARENT_COLUMN: &str = "parent_id";

/// Options for reading and writing tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularOptions {
    /// Field delimiter (default `,`).
    pub delimiter: u8,
    /// Write the [`PARENT_COLUMN`] so any tree shape survives a round trip
    /// (default `true`). Without it the table only describes trees that
    /// `insert_by_type` can rebuild.
    pub parent_ids: bool,
}

impl Default for TabularOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            parent_ids: true,
        }
    }
}

impl BoxTree {
    /// Header of the table describing this tree.
    pub fn table_columns(&self, options: &TabularOptions) -> Vec<String> {
        let mut columns: Vec<String> = std::iter::once(INDEX_COLUMN)
            .chain(FIXED_COLUMNS)
            .map(str::to_string)
            .collect();
        if options.parent_ids {
            columns.push(PARENT_COLUMN.to_string());
        }
        let fixed = columns.len();
        for node in self.iter().skip(1) {
            for (key, value) in &self[node].attributes {
                if value.is_null() || columns[..fixed].contains(key) {
                    continue;
                }
                if !columns[fixed..].contains(key) {
                    columns.push(key.clone());
                }
            }
        }
        columns
    }

    /// Write the tree as CSV.
    pub fn write_csv<W: io::Write>(&self, writer: W, options: &TabularOptions) -> Result<()> {
        let columns = self.table_columns(options);
        let mut writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .from_writer(writer);
        writer.write_record(&columns)?;

        let extra_from = 1 + FIXED_COLUMNS.len() + usize::from(options.parent_ids);
        for node in self.iter().skip(1) {
            let data = &self[node];
            for (key, value) in &data.attributes {
                if !value.is_null() && columns[..extra_from].contains(key) {
                    warn!(box_id = ?data.id, "attribute {key} is reserved and was not written");
                }
            }
            let mut row = vec![
                data.id.clone().unwrap_or_default(),
                data.rect.left.to_string(),
                data.rect.top.to_string(),
                data.rect.right.to_string(),
                data.rect.bottom.to_string(),
                AttrValue::from(data.conf).to_cell(),
                data.text.clone(),
                AttrValue::Bool(!self.children(node).is_empty()).to_cell(),
                data.box_type.code().to_string(),
            ];
            if options.parent_ids {
                let parent = self
                    .parent(node)
                    .and_then(|p| self[p].id.clone())
                    .unwrap_or_default();
                row.push(parent);
            }
            for key in &columns[extra_from..] {
                row.push(data.attribute(key).map(AttrValue::to_cell).unwrap_or_default());
            }
            writer.write_record(&row)?;
        }
        writer.flush()?;
        debug!(rows = self.len() - 1, columns = columns.len(), "wrote table");
        Ok(())
    }

    /// The CSV text of the tree with default options.
    pub fn to_csv_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer, &TabularOptions::default())?;
        String::from_utf8(buffer)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
    }

    /// Write the tree to a CSV file with default options.
    pub fn to_csv_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        self.write_csv(io::BufWriter::new(file), &TabularOptions::default())
    }

    /// Rebuild a tree from CSV.
    ///
    /// The eight columns after the index must be [`FIXED_COLUMNS`] in any
    /// order; any further column except [`PARENT_COLUMN`] becomes an
    /// attribute, with empty cells left unset. Attribute cells are decoded
    /// with [`AttrValue::from_cell`].
    pub fn read_csv<R: io::Read>(reader: R, options: &TabularOptions) -> Result<BoxTree> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .has_headers(true)
            .from_reader(reader);
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let fixed = fixed_positions(&headers)?;

        let extra = &headers[1 + FIXED_COLUMNS.len()..];
        let parent_column = extra.iter().position(|c| c == PARENT_COLUMN);

        let mut tree = BoxTree::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let cells = RowCells {
                row: row + 1,
                headers: &headers,
                fixed: &fixed,
                record: &record,
            };
            let data = cells.ocr_box(extra, parent_column)?;
            match parent_column {
                Some(position) => {
                    let parent = match cells.get(1 + FIXED_COLUMNS.len() + position) {
                        "" => tree.root(),
                        id => tree.subbox_by_id(id)?,
                    };
                    tree.add_child(parent, data)?;
                }
                None => {
                    tree.insert_by_type(data)?;
                }
            }
        }
        debug!(boxes = tree.len() - 1, "read table");
        Ok(tree)
    }

    /// Rebuild a tree from CSV text with default options.
    pub fn from_csv_str(csv: &str) -> Result<BoxTree> {
        Self::read_csv(csv.as_bytes(), &TabularOptions::default())
    }

    /// Rebuild a tree from a CSV file with default options.
    pub fn from_csv_file(path: impl AsRef<Path>) -> Result<BoxTree> {
        let file = File::open(path)?;
        Self::read_csv(io::BufReader::new(file), &TabularOptions::default())
    }
}

/// Header position of each of [`FIXED_COLUMNS`], in that order.
type FixedPositions = [usize; FIXED_COLUMNS.len()];

fn fixed_positions(headers: &[String]) -> std::result::Result<FixedPositions, StructureError> {
    let column_set = || StructureError::ColumnSet {
        expected: FIXED_COLUMNS.iter().map(|c| c.to_string()).collect(),
        found: headers.iter().skip(1).take(FIXED_COLUMNS.len()).cloned().collect(),
    };
    let found = headers.get(1..=FIXED_COLUMNS.len()).ok_or_else(column_set)?;
    let mut positions = [0; FIXED_COLUMNS.len()];
    for (slot, name) in positions.iter_mut().zip(FIXED_COLUMNS) {
        // eight distinct names in eight slots, so all found means a permutation
        *slot = 1 + found.iter().position(|c| c == name).ok_or_else(column_set)?;
    }
    Ok(positions)
}

/// One data row with its position, for error reporting.
struct RowCells<'a> {
    row: usize,
    headers: &'a [String],
    fixed: &'a FixedPositions,
    record: &'a csv::StringRecord,
}

impl RowCells<'_> {
    fn get(&self, column: usize) -> &str {
        self.record.get(column).unwrap_or("")
    }

    fn invalid(&self, column: usize) -> StructureError {
        StructureError::InvalidCell {
            row: self.row,
            column: self.headers[column].clone(),
            value: self.get(column).to_string(),
        }
    }

    fn int(&self, column: usize) -> std::result::Result<i64, StructureError> {
        self.get(column).parse().map_err(|_| self.invalid(column))
    }

    fn ocr_box(&self, extra: &[String], parent_column: Option<usize>) -> Result<OcrBox> {
        let id = self.get(0);
        if id.is_empty() {
            return Err(StructureError::MissingId.into());
        }
        let [left, top, right, bottom, conf_col, text_col, children_col, type_col] = *self.fixed;
        let rect = Rect::new(
            self.int(left)?,
            self.int(top)?,
            self.int(right)?,
            self.int(bottom)?,
        );
        let conf = match self.get(conf_col) {
            "" => None,
            cell => Some(cell.parse::<f64>().map_err(|_| self.invalid(conf_col))?),
        };
        let text = self.get(text_col);
        if AttrValue::from_cell(self.get(children_col)).as_bool().is_none() {
            return Err(self.invalid(children_col).into());
        }
        let box_type = BoxType::from_code(self.int(type_col)?)?;

        let mut data = OcrBox::new(box_type, rect, conf, text).with_id(id);
        let first_extra = 1 + FIXED_COLUMNS.len();
        for (position, key) in extra.iter().enumerate() {
            if Some(position) == parent_column {
                continue;
            }
            let cell = self.get(first_extra + position);
            if !cell.is_empty() {
                data.set_attribute(key.clone(), AttrValue::from_cell(cell));
            }
        }
        Ok(data)
    }
}
