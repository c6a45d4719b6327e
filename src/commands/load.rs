use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::report::{Report, ReportConfig, build_report};
use crate::util::{read_file, sha256_hex};

pub(super) struct LoadedReport {
    pub(super) report: Report,
    pub(super) source_sha256: String,
}

pub(super) fn load_report(input: &Path, config: &ReportConfig) -> Result<LoadedReport> {
    let bytes = read_file(input)?;
    let source_sha256 = sha256_hex(&bytes);

    let report = build_report(&bytes, config)
        .with_context(|| format!("failed to build report from {}", input.display()))?;

    info!(
        path = %input.display(),
        sha256 = %source_sha256,
        bytes = bytes.len(),
        "loaded report document"
    );

    Ok(LoadedReport {
        report,
        source_sha256,
    })
}
