//! Spreadsheet import: CSV and workbook files into creation payloads
//!
//! The first row holds the column names, matched case-insensitively. Each
//! following non-blank row becomes one payload, or a row error that leaves
//! the other rows untouched.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use tracing::{debug, info};

use crate::admin::draft::split_comma_list;
use crate::admin::vat::DEFAULT_RATE;
use crate::errors::ImportError;
use crate::models::{Client, ClientPayload, Entity, OpeningHours, Supplier, SupplierPayload};

/// Per-row outcome of a parsed import file
pub type ParsedRows<P> = Vec<Result<P, ImportError>>;

/// Turns an import file into creation payloads
pub trait ImportParser<E: Entity> {
    /// Fails only when the file as a whole is unusable: unreadable,
    /// unsupported, or missing a required column.
    fn parse(&self, path: &Path) -> Result<ParsedRows<E::Payload>, ImportError>;
}

/// One data row keyed by lower-cased column name
#[derive(Debug, Clone)]
pub struct ImportRow {
    /// 1-based line number in the source file, header included
    pub line: usize,
    cells: HashMap<String, String>,
}

impl ImportRow {
    pub fn new(line: usize, cells: HashMap<String, String>) -> Self {
        Self { line, cells }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .get(column)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn optional(&self, column: &str) -> Option<String> {
        self.get(column).map(str::to_string)
    }

    fn required(&self, column: &str) -> Result<String, ImportError> {
        self.optional(column).ok_or_else(|| self.invalid(format!("'{}' is empty", column)))
    }

    fn invalid(&self, message: String) -> ImportError {
        ImportError::InvalidRow {
            row: self.line,
            message,
        }
    }

    /// `;` separated list of extra emails
    fn emails(&self) -> Vec<String> {
        self.get("emails")
            .map(|v| {
                v.split(';')
                    .map(str::trim)
                    .filter(|e| !e.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// An empty cell counts as an absent field
    fn comma_list(&self, column: &str) -> Vec<String> {
        self.get(column).map(split_comma_list).unwrap_or_default()
    }

    fn vat_rate(&self) -> Result<f64, ImportError> {
        match self.get("vat_rate") {
            None => Ok(DEFAULT_RATE),
            Some(raw) => {
                let normalized = raw.trim_end_matches('%').trim().replace(',', ".");
                match normalized.parse::<f64>() {
                    Ok(rate) if rate.is_finite() && (0.0..=100.0).contains(&rate) => Ok(rate),
                    _ => Err(self.invalid(format!("invalid VAT rate '{}'", raw))),
                }
            }
        }
    }
}

/// Payloads that can be read from an import row
pub trait FromImportRow: Sized {
    /// Columns that must be present in the header
    const REQUIRED_COLUMNS: &'static [&'static str];
    /// Header of the sample template
    const TEMPLATE_COLUMNS: &'static [&'static str];
    /// Example row of the sample template
    const TEMPLATE_EXAMPLE: &'static [&'static str];

    fn from_row(row: &ImportRow) -> Result<Self, ImportError>;
}

const COMMON_COLUMNS: [&str; 9] = [
    "name",
    "email",
    "emails",
    "phone",
    "payment_terms",
    "siret",
    "vat_number",
    "vat_rate",
    "country_id",
];

impl FromImportRow for SupplierPayload {
    const REQUIRED_COLUMNS: &'static [&'static str] = &["name", "email"];
    const TEMPLATE_COLUMNS: &'static [&'static str] = &[
        COMMON_COLUMNS[0],
        COMMON_COLUMNS[1],
        COMMON_COLUMNS[2],
        COMMON_COLUMNS[3],
        COMMON_COLUMNS[4],
        COMMON_COLUMNS[5],
        COMMON_COLUMNS[6],
        COMMON_COLUMNS[7],
        COMMON_COLUMNS[8],
        "services",
        "coverage_zones",
    ];
    const TEMPLATE_EXAMPLE: &'static [&'static str] = &[
        "Durand Maintenance",
        "contact@durand.example",
        "compta@durand.example;sav@durand.example",
        "+33 1 23 45 67 89",
        "30 days",
        "12345678900012",
        "FR12345678901",
        "20",
        "",
        "Plumbing, Heating",
        "Paris, Lyon",
    ];

    fn from_row(row: &ImportRow) -> Result<Self, ImportError> {
        Ok(SupplierPayload {
            name: row.required("name")?,
            email: row.required("email")?,
            emails: row.emails(),
            phone: row.optional("phone"),
            payment_terms: row.optional("payment_terms"),
            siret: row.optional("siret"),
            vat_number: row.optional("vat_number"),
            vat_rate: row.vat_rate()?,
            country_id: row.optional("country_id"),
            services: row.comma_list("services"),
            coverage_zones: row.comma_list("coverage_zones"),
        })
    }
}

impl FromImportRow for ClientPayload {
    const REQUIRED_COLUMNS: &'static [&'static str] = &["name", "email"];
    const TEMPLATE_COLUMNS: &'static [&'static str] = &COMMON_COLUMNS;
    const TEMPLATE_EXAMPLE: &'static [&'static str] = &[
        "Boulangerie Martin",
        "bonjour@martin.example",
        "",
        "+33 4 56 78 90 12",
        "On receipt",
        "98765432100021",
        "FR98765432100",
        "5.5",
        "",
    ];

    fn from_row(row: &ImportRow) -> Result<Self, ImportError> {
        Ok(ClientPayload {
            name: row.required("name")?,
            email: row.required("email")?,
            emails: row.emails(),
            phone: row.optional("phone"),
            payment_terms: row.optional("payment_terms"),
            siret: row.optional("siret"),
            vat_number: row.optional("vat_number"),
            vat_rate: row.vat_rate()?,
            country_id: row.optional("country_id"),
            contacts: Vec::new(),
            accounting_contact: None,
            opening_hours: OpeningHours::default(),
        })
    }
}

/// Parser for `.csv`, `.xlsx`, `.xls` and `.ods` files
pub struct SpreadsheetParser<E> {
    _entity: PhantomData<fn() -> E>,
}

impl<E> Default for SpreadsheetParser<E> {
    fn default() -> Self {
        Self { _entity: PhantomData }
    }
}

impl<E> SpreadsheetParser<E> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E> ImportParser<E> for SpreadsheetParser<E>
where
    E: Entity,
    E::Payload: FromImportRow,
{
    fn parse(&self, path: &Path) -> Result<ParsedRows<E::Payload>, ImportError> {
        let (header, rows) = read_table(path)?;
        debug!(columns = ?header, rows = rows.len(), "Read import table");

        for column in <E::Payload as FromImportRow>::REQUIRED_COLUMNS {
            if !header.iter().any(|h| h == column) {
                return Err(ImportError::MissingColumn(column));
            }
        }

        let parsed: ParsedRows<E::Payload> = rows
            .iter()
            .map(<E::Payload as FromImportRow>::from_row)
            .collect();
        let invalid = parsed.iter().filter(|row| row.is_err()).count();
        info!(
            file = %path.display(),
            invalid,
            "Parsed {} {} rows from import file",
            parsed.len(),
            E::RESOURCE
        );
        Ok(parsed)
    }
}

type Table = (Vec<String>, Vec<ImportRow>);

fn read_table(path: &Path) -> Result<Table, ImportError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => read_csv(path),
        "xlsx" | "xlsm" | "xls" | "ods" => read_workbook(path),
        other => Err(ImportError::UnsupportedFormat(other.to_string())),
    }
}

fn normalize_header(header: &str) -> String {
    header.trim().trim_start_matches('\u{feff}').trim().to_lowercase().replace(' ', "_")
}

fn build_rows<I>(header: &[String], records: I) -> Vec<ImportRow>
where
    I: IntoIterator<Item = (usize, Vec<String>)>,
{
    records
        .into_iter()
        .filter(|(_, cells)| cells.iter().any(|c| !c.trim().is_empty()))
        .map(|(line, cells)| {
            let map = header
                .iter()
                .cloned()
                .zip(cells.into_iter().chain(std::iter::repeat(String::new())))
                .collect();
            ImportRow::new(line, map)
        })
        .collect()
}

fn read_csv(path: &Path) -> Result<Table, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let header: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();
    let mut records = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        records.push((index + 2, record.iter().map(str::to_string).collect()));
    }
    Ok((header.clone(), build_rows(&header, records)))
}

fn cell_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(v) => format!("{v}"),
        Data::Int(v) => format!("{v}"),
        Data::Bool(v) => v.to_string(),
        other => other.to_string(),
    }
}

fn read_workbook(path: &Path) -> Result<Table, ImportError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| ImportError::Workbook(e.to_string()))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ImportError::NoWorksheet)?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| ImportError::Workbook(e.to_string()))?;

    let mut rows = range.rows();
    let header: Vec<String> = match rows.next() {
        Some(row) => row.iter().map(|c| normalize_header(&cell_string(c))).collect(),
        None => return Ok((Vec::new(), Vec::new())),
    };
    let records = rows
        .enumerate()
        .map(|(index, row)| (index + 2, row.iter().map(cell_string).collect()));
    Ok((header.clone(), build_rows(&header, records)))
}

/// Write the sample template of an entity type as CSV
pub fn write_sample<P: FromImportRow>(path: &Path) -> Result<(), ImportError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(P::TEMPLATE_COLUMNS)?;
    writer.write_record(P::TEMPLATE_EXAMPLE)?;
    writer.flush()?;
    info!(file = %path.display(), "Sample template written");
    Ok(())
}

/// File name offered for the sample template
pub fn sample_file_name<E: Entity>() -> String {
    format!("{}_sample.csv", E::RESOURCE)
}

pub fn supplier_parser() -> SpreadsheetParser<Supplier> {
    SpreadsheetParser::new()
}

pub fn client_parser() -> SpreadsheetParser<Client> {
    SpreadsheetParser::new()
}
