use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use treino_core::{PlanRecordInput, render_document};

/// Execute `treino render`: read a plan payload (file or `-` for stdin) and
/// write the PDF.
pub async fn run_render(source: &str, output: &Path) -> Result<()> {
    let input = read_payload(source)?;
    let doc = render_document(input).await?;

    std::fs::write(output, &doc.bytes)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!(
        "PDF written to {} ({} page(s), {} bytes)",
        output.display(),
        doc.page_count,
        doc.bytes.len()
    );
    Ok(())
}

/// Parse a plan payload from `source`, or from stdin when `source` is `-`.
pub fn read_payload(source: &str) -> Result<PlanRecordInput> {
    let contents = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read plan from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source).with_context(|| format!("failed to read {source}"))?
    };
    serde_json::from_str(&contents).with_context(|| format!("invalid plan JSON in {source}"))
}
