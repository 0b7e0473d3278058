use anyhow::{anyhow, Context, Result};
use std::path::Path;
use vista_query::{parse_query_pairs, DataResponse};
use vista_web::AppState;

/// Split `key=value`; a missing `=` means an empty value
pub fn parse_param(param: &str) -> Result<(String, String)> {
    let (key, value) = param.split_once('=').unwrap_or((param, ""));
    if key.is_empty() {
        return Err(anyhow!("invalid parameter {:?}: empty key", param));
    }
    Ok((key.to_string(), value.to_string()))
}

pub async fn fetch(config_path: &Path, widget_id: &str, params: &[String]) -> Result<DataResponse> {
    let config = vista_config::load(config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;
    let pairs = params
        .iter()
        .map(|param| parse_param(param))
        .collect::<Result<Vec<_>>>()?;
    let request = parse_query_pairs(pairs);

    let state = AppState::from_config(config).await?;
    let widget = state
        .config
        .find_widget(widget_id)
        .ok_or_else(|| anyhow!("widget '{}' not found", widget_id))?;
    let provider = state
        .providers
        .get(&widget.provider.name)
        .ok_or_else(|| anyhow!("unknown provider '{}'", widget.provider.name))?;

    Ok(provider.fetch(widget, &request).await?)
}

pub async fn execute(config_path: &Path, widget_id: &str, params: &[String]) -> Result<()> {
    let response = fetch(config_path, widget_id, params).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
