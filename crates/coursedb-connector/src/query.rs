//! SELECT statement construction for the external course table.
//!
//! The external table is read with a single generated SELECT. Interpolated
//! condition values are escaped per the configured quoting style and encoded
//! with the external codec; column identifiers are quote-escaped. The table
//! name comes from trusted administrator configuration and is interpolated
//! as given.

use crate::encoding::TextEncoding;
use crate::escape::{escape_identifier, escape_value, QuotingStyle};

/// Builder for the read query issued against the external table.
#[derive(Debug, Clone)]
pub struct SelectQuery {
    table: String,
    conditions: Vec<(String, String)>,
    fields: Vec<String>,
    distinct: bool,
    order_by: Option<String>,
}

impl SelectQuery {
    /// Select all columns of every row in `table`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            conditions: Vec::new(),
            fields: Vec::new(),
            distinct: false,
            order_by: None,
        }
    }

    /// Add an equality condition. Conditions combine with AND.
    pub fn with_condition(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.conditions.push((column.into(), value.into()));
        self
    }

    /// Restrict the projection to the given columns.
    #[must_use]
    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = fields;
        self
    }

    /// Request DISTINCT rows.
    #[must_use]
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Order rows by the given column.
    pub fn order_by(mut self, column: impl Into<String>) -> Self {
        self.order_by = Some(column.into());
        self
    }

    /// The table this query reads.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Render the SQL text.
    ///
    /// Condition values pass through `escape_value` and the external
    /// encoding's encoder. Non-ASCII characters that the legacy encodings
    /// map outside UTF-8 degrade to replacement text, since the query is
    /// carried on a UTF-8 wire.
    #[must_use]
    pub fn build(&self, style: QuotingStyle, encoding: TextEncoding) -> String {
        let projection = if self.fields.is_empty() {
            "*".to_string()
        } else {
            self.fields
                .iter()
                .map(|f| format!("\"{}\"", escape_identifier(f)))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut sql = format!(
            "SELECT {}{} FROM {}",
            if self.distinct { "DISTINCT " } else { "" },
            projection,
            self.table
        );

        if !self.conditions.is_empty() {
            let clauses: Vec<String> = self
                .conditions
                .iter()
                .map(|(column, value)| {
                    let escaped = escape_value(value, style);
                    let encoded = encoding.encode(&escaped);
                    format!(
                        "\"{}\" = '{}'",
                        escape_identifier(column),
                        String::from_utf8_lossy(&encoded)
                    )
                })
                .collect();
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        if let Some(order) = &self.order_by {
            sql.push_str(&format!(" ORDER BY \"{}\"", escape_identifier(order)));
        }

        sql
    }
}
