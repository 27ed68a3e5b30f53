use std::collections::HashSet;

use calamine::Data;

use super::types::ParsedTable;

const EMPTY_HEADER: &str = "__EMPTY";
const REVIEW_COLUMN: &str = "review";
const MIN_REVIEW_CHARS: usize = 3;

/// Turns a raw header row into unique column keys. Blank headers become
/// `__EMPTY`; repeats get a numeric suffix (`rating`, `rating_1`, ...).
pub fn header_names<I>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut existing_names = HashSet::new();
    raw.into_iter()
        .map(|name| unique_name(name.trim(), &mut existing_names))
        .collect()
}

fn unique_name(name: &str, existing_names: &mut HashSet<String>) -> String {
    let original_name = if name.is_empty() {
        EMPTY_HEADER.to_string()
    } else {
        name.to_string()
    };

    let mut cleaned = original_name.clone();
    let mut counter = 1;
    while !existing_names.insert(cleaned.clone()) {
        cleaned = format!("{}_{}", original_name, counter);
        counter += 1;
    }

    cleaned
}

/// Pads short records with empty cells and drops cells past the header so
/// every row carries exactly `width` values.
pub fn align_row(mut values: Vec<String>, width: usize, line: u64) -> Vec<String> {
    if values.len() > width {
        tracing::warn!(
            "Row at line {} has {} fields but the header has {}; extra fields dropped",
            line,
            values.len(),
            width
        );
        values.truncate(width);
    }
    values.resize(width, String::new());
    values
}

pub fn is_blank_row(cells: &[Data]) -> bool {
    cells.iter().all(|cell| match cell {
        Data::Empty => true,
        Data::String(s) => s.is_empty(),
        _ => false,
    })
}

/// Display form of a spreadsheet cell. Dates stay as their serial number,
/// the same value a raw sheet export shows.
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::DateTime(d) => d.as_f64().to_string(),
        other => other.to_string(),
    }
}

/// Each newline becomes one space; only the ends are trimmed.
pub fn clean_review_text(text: &str) -> String {
    text.replace('\n', " ").trim().to_string()
}

fn is_substantial(text: &str) -> bool {
    text.chars().count() > MIN_REVIEW_CHARS
}

/// Review texts the analysis backend will find in this table. A `review`
/// column wins outright; otherwise each row's substantial text cells are
/// joined into one review.
pub fn extract_reviews(table: &ParsedTable) -> Vec<String> {
    if table.columns().iter().any(|c| c == REVIEW_COLUMN) {
        return table
            .rows()
            .filter_map(|row| row.get(REVIEW_COLUMN).map(clean_review_text))
            .filter(|text| is_substantial(text))
            .collect();
    }

    table
        .rows()
        .filter_map(|row| {
            let texts: Vec<String> = row
                .values()
                .iter()
                .filter(|value| value.parse::<f64>().is_err())
                .map(|value| clean_review_text(value))
                .filter(|text| is_substantial(text))
                .collect();

            if texts.is_empty() {
                None
            } else {
                Some(texts.join(" / "))
            }
        })
        .collect()
}
