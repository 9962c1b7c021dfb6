use serde_json::json;

use crate::auth::Permission;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

pub fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let keys: Vec<&str> = Permission::ALL.iter().map(|p| p.as_str()).collect();

    match output_format {
        OutputFormat::Text => {
            for key in &keys {
                println!("{}", key);
            }
            Ok(())
        }
        OutputFormat::Json => output_success(&output_format, "permissions", Some(json!({ "permissions": keys }))),
    }
}
