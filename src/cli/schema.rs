use crate::cli::SchemaArgs;
use reportlens::config::Config;
use reportlens::parser::ReportDocument;
use schemars::schema_for;

pub fn execute(args: SchemaArgs) -> anyhow::Result<()> {
    let schema = if args.config {
        schema_for!(Config)
    } else {
        schema_for!(ReportDocument)
    };
    let json = serde_json::to_string_pretty(&schema)?;
    println!("{}", json);
    Ok(())
}
