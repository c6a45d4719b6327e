use anyhow::{Context, Result};
use serde_json::Value;
use tracing::info;

use crate::cli::ValidateArgs;
use crate::report::{parse_document, validate_document};
use crate::util::{read_file, sha256_hex};

const OPTIONAL_SECTIONS: [&str; 7] = [
    "mediana_cpa",
    "rankings",
    "duplicar",
    "acciones_urgentes",
    "historico",
    "glosario",
    "comparativa_managers",
];

pub fn run(args: ValidateArgs) -> Result<()> {
    let bytes = read_file(&args.input)?;
    let value = parse_document(&bytes)
        .with_context(|| format!("failed to validate {}", args.input.display()))?;
    let document = validate_document(&value)
        .with_context(|| format!("failed to validate {}", args.input.display()))?;

    let present = OPTIONAL_SECTIONS
        .iter()
        .copied()
        .filter(|key| document.section(key).is_some())
        .collect::<Vec<&str>>();
    let client = document
        .meta
        .get("cliente")
        .and_then(Value::as_str)
        .unwrap_or_default();

    info!(
        path = %args.input.display(),
        sha256 = %sha256_hex(&bytes),
        client = %client,
        ads = document.ads.len(),
        summary_keys = document.summary.len(),
        optional_sections = %present.join(","),
        "report document is valid"
    );

    Ok(())
}
