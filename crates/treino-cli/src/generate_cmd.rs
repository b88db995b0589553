use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use treino_core::{PlanRecord, PlanService, UserProfile};

/// Execute `treino generate`: one Generate call, pretty JSON to stdout or a file.
pub async fn run_generate(
    service: &PlanService,
    profile: UserProfile,
    output: Option<&Path>,
) -> Result<()> {
    info!(model = service.model_name(), "generating workout plan");
    let record = service.generate_plan(profile).await?;
    let json = to_pretty_json(&record)?;

    match output {
        Some(path) => {
            std::fs::write(path, json.as_bytes())
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Plan written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn to_pretty_json(record: &PlanRecord) -> Result<String> {
    let mut json = serde_json::to_string_pretty(record).context("failed to serialize plan")?;
    json.push('\n');
    Ok(json)
}
