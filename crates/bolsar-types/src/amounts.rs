//! Negotiated-amounts matrix.

use serde::{Deserialize, Serialize};

/// File name of the persisted negotiated-amounts table.
pub const NEGOTIATED_AMOUNTS_FILE: &str = "montos_negociados.csv";

/// Number of rows kept when persisting: the header and the day's totals.
const HEADLINE_ROWS: usize = 2;

/// Money negotiated per instrument category, as read from the page table.
///
/// Cells are kept verbatim in row/column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiatedAmounts {
    rows: Vec<Vec<String>>,
}

impl NegotiatedAmounts {
    /// Creates a matrix from rows of cell text.
    #[must_use]
    pub const fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Returns all rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Returns the rows that get persisted: the header and first data row.
    #[must_use]
    pub fn headline(&self) -> &[Vec<String>] {
        &self.rows[..self.rows.len().min(HEADLINE_ROWS)]
    }

    /// Returns the number of rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the matrix has no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
