use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::cart::{Cart, CartCommand};
use crate::model::ItemDraft;
use crate::Amount;

/// Errors that can occur when reading cart actions or writing the summary
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("failed to open {path}: {source}")]
    Open { path: String, source: csv::Error },

    #[error("line {line}: failed to parse row: {source}")]
    Parse { line: usize, source: csv::Error },

    #[error("line {line}: unrecognized action '{action}'")]
    UnrecognizedAction { line: usize, action: String },

    #[error("line {line}: {action} missing {field}")]
    MissingField {
        line: usize,
        action: String,
        field: &'static str,
    },

    #[error("failed to write summary row: {0}")]
    Write(#[from] csv::Error),

    #[error("failed to flush summary: {0}")]
    Flush(#[from] io::Error),
}

#[derive(Debug, Deserialize)]
struct InputRow {
    action: String,
    id: String,
    name: Option<String>,
    price: Option<f64>,
    quantity: Option<u32>,
    customization: Option<String>,
}

#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    kind: &'a str,
    id: &'a str,
    name: &'a str,
    customization: &'a str,
    unit_price: String,
    quantity: Option<u32>,
    amount: String,
}

impl<'a> OutputRow<'a> {
    fn total(kind: &'a str, amount: Amount) -> Self {
        Self {
            kind,
            id: "",
            name: "",
            customization: "",
            unit_price: String::new(),
            quantity: None,
            amount: format!("{amount:.2}"),
        }
    }
}

/// Read cart actions from a csv file.
///
/// Columns: `action,id,name,price,quantity,customization` where `action` is
/// one of `add`, `set` or `remove`. An `add` without quantity adds one unit.
pub fn read_actions(
    path: impl AsRef<Path>,
) -> Result<impl Iterator<Item = Result<CartCommand, CsvError>>, CsvError> {
    let path = path.as_ref();
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| CsvError::Open {
            path: path.display().to_string(),
            source,
        })?;
    Ok(parse_actions(reader))
}

fn parse_actions<R: io::Read>(
    reader: csv::Reader<R>,
) -> impl Iterator<Item = Result<CartCommand, CsvError>> {
    reader
        .into_deserialize::<InputRow>()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 2; // 1-indexed, skip header
            let row = result.map_err(|source| CsvError::Parse { line, source })?;
            to_command(line, row)
        })
}

fn to_command(line: usize, row: InputRow) -> Result<CartCommand, CsvError> {
    let missing = |field| CsvError::MissingField {
        line,
        action: row.action.clone(),
        field,
    };

    match row.action.as_str() {
        "add" => {
            let name = row.name.clone().ok_or_else(|| missing("name"))?;
            let price = row.price.ok_or_else(|| missing("price"))?;
            let mut item = ItemDraft::new(row.id.clone(), name, Amount::from_float(price));
            item.customization = row.customization.clone();
            Ok(CartCommand::Add {
                item,
                quantity: row.quantity.unwrap_or(1),
            })
        }
        "set" => {
            let quantity = row.quantity.ok_or_else(|| missing("quantity"))?;
            Ok(CartCommand::SetQuantity {
                id: row.id.clone(),
                quantity,
            })
        }
        "remove" => Ok(CartCommand::Remove { id: row.id.clone() }),
        other => Err(CsvError::UnrecognizedAction {
            line,
            action: other.to_string(),
        }),
    }
}

/// Write the cart lines followed by the totals in csv format
pub fn write_summary(writer: impl io::Write, cart: &Cart) -> Result<(), CsvError> {
    let mut writer = csv::Writer::from_writer(writer);

    for line in cart.lines() {
        writer.serialize(OutputRow {
            kind: "item",
            id: &line.id,
            name: &line.name,
            customization: line.customization.as_deref().unwrap_or(""),
            unit_price: format!("{:.2}", line.unit_price),
            quantity: Some(line.quantity),
            amount: format!("{:.2}", line.line_total()),
        })?;
    }

    let totals = cart.totals();
    for (kind, amount) in [
        ("subtotal", totals.subtotal),
        ("delivery_fee", totals.delivery_fee),
        ("tax", totals.tax),
        ("discount", totals.discount),
        ("grand_total", totals.grand_total),
    ] {
        writer.serialize(OutputRow::total(kind, amount))?;
    }

    writer.flush()?;
    Ok(())
}
