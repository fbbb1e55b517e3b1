//! KiCad CSV BOM reading and writing.
//!
//! Parses the standard KiCad BOM export
//! (`Reference,Value,Footprint,Datasheet,Description,Vendor,MPN`) into
//! [`BomRow`] records and writes them back out with the pricing columns
//! appended. Columns the parser does not recognize are preserved verbatim
//! in their original positions.

use std::path::Path;

use thiserror::Error;

/// Columns appended to the output by the pricing pass, in order.
pub const PRICE_COLUMNS: [&str; 5] = [
    "Unit_Price",
    "Extended_Price",
    "Mouser_Part_Number",
    "Packaging",
    "Status",
];

/// Placeholder written for the numeric price columns when no price was found.
pub const PRICE_PLACEHOLDER: &str = "N/A";

#[derive(Debug, Error)]
pub enum BomError {
    #[error("missing required column '{0}' in BOM header")]
    MissingColumn(&'static str),

    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One schedule line of the design, as exported by KiCad.
///
/// Named fields hold the trimmed values of the recognized columns; `cells`
/// holds every cell of the line in header order so unrecognized columns
/// survive the round trip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BomRow {
    pub reference: String,
    pub value: String,
    pub footprint: String,
    pub datasheet: String,
    pub description: String,
    pub vendor: String,
    pub mpn: String,
    pub cells: Vec<String>,
}

impl BomRow {
    /// Number of reference designators on this line (`"R1, R2, R3"` -> 3).
    pub fn quantity(&self) -> usize {
        self.reference
            .split(',')
            .filter(|r| !r.trim().is_empty())
            .count()
    }
}

/// A parsed BOM: the original header plus one [`BomRow`] per data line.
#[derive(Debug, Clone, Default)]
pub struct BomFile {
    pub headers: Vec<String>,
    pub rows: Vec<BomRow>,
}

/// How a priced row was matched on the distributor side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMethod {
    Mpn,
    Keyword,
}

/// Outcome of the distributor lookup for one part identity.
///
/// The three status strings of the output format exist only in
/// [`Pricing::status`]; everything upstream works with this enum.
#[derive(Debug, Clone, PartialEq)]
pub enum Pricing {
    Found {
        unit_price: f64,
        mouser_part_number: String,
        packaging: String,
        via: MatchMethod,
    },
    NotFound,
}

impl Pricing {
    pub fn status(&self) -> &'static str {
        match self {
            Pricing::Found {
                via: MatchMethod::Mpn,
                ..
            } => "Found by MPN",
            Pricing::Found {
                via: MatchMethod::Keyword,
                ..
            } => "Found by Value keyword",
            Pricing::NotFound => "Not found",
        }
    }
}

/// Parse a KiCad CSV BOM. `Reference` and `Value` are required columns;
/// the remaining recognized columns default to empty when absent.
pub fn read_bom(path: &Path) -> Result<BomFile, BomError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;

    let mut headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    // KiCad exports UTF-8 with a BOM; it lands on the first header cell.
    if let Some(first) = headers.first_mut() {
        if let Some(stripped) = first.strip_prefix('\u{feff}') {
            *first = stripped.to_string();
        }
    }

    let index = |name: &'static str| headers.iter().position(|h| h == name);
    let reference_idx = index("Reference").ok_or(BomError::MissingColumn("Reference"))?;
    let value_idx = index("Value").ok_or(BomError::MissingColumn("Value"))?;
    let footprint_idx = index("Footprint");
    let datasheet_idx = index("Datasheet");
    let description_idx = index("Description");
    let vendor_idx = index("Vendor");
    let mpn_idx = index("MPN");

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;

        if record.is_empty() {
            continue;
        }

        let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
        cells.resize(headers.len(), String::new());

        fn get(cells: &[String], idx: Option<usize>) -> String {
            idx.map(|i| cells[i].trim().to_string()).unwrap_or_default()
        }

        rows.push(BomRow {
            reference: cells[reference_idx].trim().to_string(),
            value: cells[value_idx].trim().to_string(),
            footprint: get(&cells, footprint_idx),
            datasheet: get(&cells, datasheet_idx),
            description: get(&cells, description_idx),
            vendor: get(&cells, vendor_idx),
            mpn: get(&cells, mpn_idx),
            cells,
        });
    }

    Ok(BomFile { headers, rows })
}

/// Write the BOM back out with the five pricing columns appended. `pricing`
/// must be aligned with `bom.rows`.
pub fn write_bom(path: &Path, bom: &BomFile, pricing: &[Pricing]) -> Result<(), BomError> {
    debug_assert_eq!(bom.rows.len(), pricing.len());

    let mut writer = csv::Writer::from_path(path)?;

    let mut header: Vec<&str> = bom.headers.iter().map(String::as_str).collect();
    header.extend(PRICE_COLUMNS);
    writer.write_record(&header)?;

    for (row, pricing) in bom.rows.iter().zip(pricing) {
        let mut record = row.cells.clone();
        record.extend(price_cells(row, pricing));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

fn price_cells(row: &BomRow, pricing: &Pricing) -> [String; 5] {
    match pricing {
        Pricing::Found {
            unit_price,
            mouser_part_number,
            packaging,
            ..
        } => {
            let extended = unit_price * row.quantity() as f64;
            [
                format!("{unit_price:.2}"),
                format!("{extended:.2}"),
                mouser_part_number.clone(),
                packaging.clone(),
                pricing.status().to_string(),
            ]
        }
        Pricing::NotFound => [
            PRICE_PLACEHOLDER.to_string(),
            PRICE_PLACEHOLDER.to_string(),
            String::new(),
            String::new(),
            pricing.status().to_string(),
        ],
    }
}
