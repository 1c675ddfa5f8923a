//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, Write};

use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use panos_core::Report;

use crate::cli::OutputFormat;
use crate::error::CliError;

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a report whose result is a list.
///
/// Structured formats serialize the whole report so `changed` survives;
/// `table` and `plain` render only the rows.
pub fn render_report<T, R>(
    format: OutputFormat,
    report: &Report<Vec<T>>,
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = report.result.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Plain => Ok(report
            .result
            .iter()
            .map(id_fn)
            .collect::<Vec<_>>()
            .join("\n")),
        structured => render_structured(structured, report),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since single-item views don't derive `Tabled`.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Plain => Ok(id_fn(data)),
        structured => render_structured(structured, data),
    }
}

/// JSON or YAML for structured formats, `None` for human ones.
pub fn render_machine<T: Serialize + ?Sized>(
    format: OutputFormat,
    data: &T,
) -> Result<Option<String>, CliError> {
    match format {
        OutputFormat::Table | OutputFormat::Plain => Ok(None),
        structured => render_structured(structured, data).map(Some),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_structured<T: Serialize + ?Sized>(
    format: OutputFormat,
    data: &T,
) -> Result<String, CliError> {
    Ok(match format {
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?.trim_end().to_owned(),
        _ => serde_json::to_string_pretty(data)?,
    })
}

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Item {
        serial: String,
    }

    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "Serial")]
        serial: String,
    }

    fn report() -> Report<Vec<Item>> {
        Report::unchanged(vec![
            Item {
                serial: "0071".into(),
            },
            Item {
                serial: "0072".into(),
            },
        ])
    }

    fn render(format: OutputFormat) -> String {
        render_report(
            format,
            &report(),
            |i| Row {
                serial: i.serial.clone(),
            },
            |i| i.serial.clone(),
        )
        .unwrap()
    }

    #[test]
    fn compact_json_keeps_changed_flag() {
        assert_eq!(
            render(OutputFormat::JsonCompact),
            r#"{"changed":false,"result":[{"serial":"0071"},{"serial":"0072"}]}"#
        );
    }

    #[test]
    fn plain_is_one_serial_per_line() {
        assert_eq!(render(OutputFormat::Plain), "0071\n0072");
    }

    #[test]
    fn table_has_header() {
        let table = render(OutputFormat::Table);
        assert!(table.contains("Serial"));
        assert!(table.contains("0072"));
    }

    #[test]
    fn machine_output_skips_human_formats() {
        assert!(render_machine(OutputFormat::Table, &1).unwrap().is_none());
        let yaml = render_machine(OutputFormat::Yaml, &report()).unwrap().unwrap();
        assert!(yaml.starts_with("changed: false\nresult:"));
    }
}
