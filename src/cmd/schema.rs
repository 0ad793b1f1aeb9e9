//! Schema command - print the expected input format and export columns

use crate::core::{FieldSpec, ReconciliationRecord, ReportSnapshot};
use clap::Args;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Output format: json-schema, csv-header or csv-fields
    #[arg(value_enum, default_value = "json-schema")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for the report snapshot input
    JsonSchema,
    /// CSV header row of the reconciliation export
    CsvHeader,
    /// Reconciliation record field descriptions
    CsvFields,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::JsonSchema => {
                let schema = schema_for!(ReportSnapshot);
                println!("{}", serde_json::to_string_pretty(&schema)?);
            }
            SchemaFormat::CsvHeader => println!("{}", csv_header(ReconciliationRecord::record_schema())),
            SchemaFormat::CsvFields => print_fields(ReconciliationRecord::record_schema()),
        }
        Ok(())
    }
}

fn csv_header(fields: &[FieldSpec]) -> String {
    fields.iter().map(|f| f.name).collect::<Vec<_>>().join(",")
}

fn print_fields(fields: &[FieldSpec]) {
    println!("Reconciliation Record Fields");
    println!("============================");
    println!();
    for field in fields {
        let req = if field.required { "required" } else { "optional" };
        println!("{:28} ({:8})  {}", field.name, req, field.description);
    }
    println!();
    println!("Missing or null numeric fields are read as 0.");
}
