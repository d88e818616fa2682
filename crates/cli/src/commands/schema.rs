//! Schema display, shared by the remote `schema` and offline `inspect` commands

use anyhow::Result;
use colored::Colorize;
use pricer_lib::SchemaReport;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{color_flag, display_name, print_json, print_warning, OutputFormat};

/// Row for the feature slot table
#[derive(Tabled)]
struct FeatureRow {
    #[tabled(rename = "Slot")]
    slot: usize,
    #[tabled(rename = "Feature")]
    name: String,
    #[tabled(rename = "Input")]
    input: String,
}

/// Row for the categorical group table
#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "Group")]
    key: String,
    #[tabled(rename = "Options")]
    options: String,
}

/// Fetch and show the schema of the model a server has loaded
pub async fn show_schema(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let schema = client.schema().await?;
    print_schema(&schema, format)
}

pub fn print_schema(schema: &SchemaReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(schema)?,
        OutputFormat::Table => {
            println!("{}", "Model Schema".bold());
            println!("{}", "=".repeat(60));
            println!("Model kind:     {}", schema.model_kind.cyan());
            println!("Feature count:  {}", schema.expected_count);
            println!("Count known:    {}", color_flag(schema.count_known));
            println!("Count source:   {}", count_source_label(schema));
            println!();

            if let Some(warning) = &schema.warning {
                print_warning(warning);
                println!();
            }

            if schema.feature_names.is_empty() {
                print_warning("Model exposes no feature names; inputs are placed by position");
            } else {
                let rows = feature_rows(schema);

                let table = tabled::Table::new(rows)
                    .with(tabled::settings::Style::rounded())
                    .to_string();
                println!("{}", table);
            }

            if !schema.categorical_groups.is_empty() {
                println!();
                let rows: Vec<GroupRow> = schema
                    .categorical_groups
                    .iter()
                    .map(|g| GroupRow {
                        key: g.key.clone(),
                        options: g.options.join(", "),
                    })
                    .collect();

                let table = tabled::Table::new(rows)
                    .with(tabled::settings::Style::rounded())
                    .to_string();
                println!("{}", table);
            }
        }
    }

    Ok(())
}

/// One row per slot, annotated with the known input name-mapped into it
fn feature_rows(schema: &SchemaReport) -> Vec<FeatureRow> {
    schema
        .feature_names
        .iter()
        .enumerate()
        .map(|(slot, name)| FeatureRow {
            slot,
            name: display_name(name.as_deref()),
            input: schema
                .input_at(slot)
                .map(|input| input.name().to_string())
                .unwrap_or_default(),
        })
        .collect()
}

fn count_source_label(schema: &SchemaReport) -> String {
    // The serde name doubles as the display label.
    serde_json::to_value(schema.count_source)
        .ok()
        .and_then(|v| v.as_str().map(|s| s.replace('_', " ")))
        .unwrap_or_default()
}
