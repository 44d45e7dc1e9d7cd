//! `batchUpdate` requests that style the results worksheet.

use serde_json::{json, Value};

use crate::sink::TABLE_HEADERS;

/// Cell background color, components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl Rgb {
    fn to_json(self) -> Value {
        json!({ "red": self.red, "green": self.green, "blue": self.blue })
    }
}

/// Light green behind the Buy Opportunity column.
pub const BUY_TINT: Rgb = Rgb {
    red: 0.85,
    green: 0.95,
    blue: 0.85,
};

/// Light red behind the Sell Opportunity column.
pub const SELL_TINT: Rgb = Rgb {
    red: 0.95,
    green: 0.85,
    blue: 0.85,
};

const BUY_COLUMN: u32 = 6;
const SELL_COLUMN: u32 = 7;

/// Styling for a freshly written table of `num_rows` rows (header included).
///
/// The header row is bolded. The whole data range of columns G and H is
/// tinted, whatever the cell values are.
pub fn format_requests(sheet_id: i64, num_rows: usize) -> Vec<Value> {
    let width = TABLE_HEADERS.len() as u32;
    let mut requests = vec![json!({
        "repeatCell": {
            "range": grid_range(sheet_id, 0, 1, 0, width),
            "cell": { "userEnteredFormat": { "textFormat": { "bold": true } } },
            "fields": "userEnteredFormat.textFormat.bold"
        }
    })];

    if num_rows > 1 {
        let end = num_rows as u32;
        for (column, tint) in [(BUY_COLUMN, BUY_TINT), (SELL_COLUMN, SELL_TINT)] {
            requests.push(json!({
                "repeatCell": {
                    "range": grid_range(sheet_id, 1, end, column, column + 1),
                    "cell": { "userEnteredFormat": { "backgroundColor": tint.to_json() } },
                    "fields": "userEnteredFormat.backgroundColor"
                }
            }));
        }
    }
    requests
}

fn grid_range(sheet_id: i64, start_row: u32, end_row: u32, start_col: u32, end_col: u32) -> Value {
    json!({
        "sheetId": sheet_id,
        "startRowIndex": start_row,
        "endRowIndex": end_row,
        "startColumnIndex": start_col,
        "endColumnIndex": end_col
    })
}
