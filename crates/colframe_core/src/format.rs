//! Text rendering of series and dataframes.

use std::fmt;

use crate::config::ExecutionConfig;
use crate::frame::DataFrame;
use crate::scalar::ScalarValue;
use crate::series::Series;

/// Formatting options for values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions<'a> {
    /// String to use for printing null values.
    pub null: &'a str,
    /// String to use when a string value is empty.
    pub empty_string: &'a str,
    /// Marker for elided rows.
    pub ellipsis: &'a str,
}

impl FormatOptions<'_> {
    pub const fn new() -> Self {
        FormatOptions {
            null: "null",
            empty_string: "\"\"",
            ellipsis: "…",
        }
    }
}

impl Default for FormatOptions<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct FormattedScalarValue<'a> {
    options: &'a FormatOptions<'a>,
    scalar: ScalarValue,
}

impl fmt::Display for FormattedScalarValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scalar {
            ScalarValue::Null => write!(f, "{}", self.options.null),
            ScalarValue::Utf8(v) if v.is_empty() => write!(f, "{}", self.options.empty_string),
            other => write!(f, "{other}"),
        }
    }
}

/// Rows shown for a table of `height` rows, split into the leading and
/// trailing rows around an elision marker.
fn visible_rows(height: usize, max_rows: usize) -> (Vec<usize>, Vec<usize>) {
    if height <= max_rows {
        return ((0..height).collect(), Vec::new());
    }
    let head = max_rows.div_ceil(2);
    let tail = max_rows / 2;
    ((0..head).collect(), (height - tail..height).collect())
}

/// Renders a dataframe as an aligned text table.
#[derive(Debug, Clone)]
pub struct TableFormatter<'a> {
    options: FormatOptions<'a>,
    max_rows: usize,
}

impl<'a> TableFormatter<'a> {
    pub const fn new(options: FormatOptions<'a>, max_rows: usize) -> Self {
        TableFormatter { options, max_rows }
    }

    pub fn format_value(&self, series: &Series, idx: usize) -> String {
        FormattedScalarValue {
            options: &self.options,
            scalar: series.array().scalar_at(idx),
        }
        .to_string()
    }

    /// Render the table, header first, then dtypes, then the rows.
    pub fn render(&self, df: &DataFrame, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (head, tail) = visible_rows(df.height(), self.max_rows);
        let elided = head.len() + tail.len() < df.height();

        // Cells per column: name, dtype, then visible values.
        let cells: Vec<Vec<String>> = df
            .iter()
            .map(|series| {
                let mut col = vec![series.name().to_string(), series.dtype().to_string()];
                col.extend(head.iter().map(|&idx| self.format_value(series, idx)));
                if elided {
                    col.push(self.options.ellipsis.to_string());
                }
                col.extend(tail.iter().map(|&idx| self.format_value(series, idx)));
                col
            })
            .collect();

        let widths: Vec<usize> = cells
            .iter()
            .map(|col| col.iter().map(|c| c.chars().count()).max().unwrap_or(0))
            .collect();

        writeln!(f, "shape: ({}, {})", df.height(), df.width())?;
        write_border(f, &widths)?;

        let num_lines = cells.first().map(|col| col.len()).unwrap_or(0);
        for line in 0..num_lines {
            if line == 2 {
                write_border(f, &widths)?;
            }
            write!(f, "|")?;
            for (col, width) in cells.iter().zip(&widths) {
                write!(f, " {:<width$} |", col[line])?;
            }
            writeln!(f)?;
        }

        write_border(f, &widths)
    }
}

fn write_border(f: &mut fmt::Formatter<'_>, widths: &[usize]) -> fmt::Result {
    write!(f, "+")?;
    for width in widths {
        write!(f, "{}+", "-".repeat(width + 2))?;
    }
    writeln!(f)
}

impl fmt::Display for DataFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let max_rows = ExecutionConfig::global().display_max_rows;
        TableFormatter::new(FormatOptions::new(), max_rows).render(self, f)
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let options = FormatOptions::new();
        let max_rows = ExecutionConfig::global().display_max_rows;
        let (head, tail) = visible_rows(self.len(), max_rows);

        let format = |idx: usize| FormattedScalarValue {
            options: &options,
            scalar: self.array().scalar_at(idx),
        };

        writeln!(f, "series: '{}' [{}]", self.name(), self.dtype())?;
        write!(f, "[")?;
        for &idx in &head {
            write!(f, "\n\t{}", format(idx))?;
        }
        if head.len() + tail.len() < self.len() {
            write!(f, "\n\t{}", options.ellipsis)?;
        }
        for &idx in &tail {
            write!(f, "\n\t{}", format(idx))?;
        }
        if !self.is_empty() {
            writeln!(f)?;
        }
        write!(f, "]")
    }
}
