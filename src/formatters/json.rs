use anyhow::{Context, Result};
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;

use crate::core::Analysis;

/// Renders an [`Analysis`] as a single JSON document.
pub struct JsonFormatter {
    pretty: bool,
    /// Include the per-file fact map (large on big trees).
    include_facts: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self {
            pretty: false,
            include_facts: false,
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_facts(mut self, include_facts: bool) -> Self {
        self.include_facts = include_facts;
        self
    }

    pub fn format_to_file(&self, analysis: &Analysis, output_path: &Path) -> Result<()> {
        let json_content = self.format_analysis(analysis)?;
        fs::write(output_path, json_content)
            .with_context(|| format!("failed to write {}", output_path.display()))?;
        Ok(())
    }

    pub fn format_analysis(&self, analysis: &Analysis) -> Result<String> {
        let value = self.to_value(analysis)?;
        let rendered = if self.pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        Ok(rendered)
    }

    pub fn to_value(&self, analysis: &Analysis) -> Result<Value> {
        let parse_failures: Vec<Value> = analysis
            .parse_failures()
            .map(|(path, failure)| json!({ "path": path, "reason": failure.reason }))
            .collect();

        let mut output = Map::new();
        output.insert(
            "summary".to_string(),
            json!({
                "files": analysis.files.len(),
                "parsed": analysis.parsed_count(),
                "parse_failures": parse_failures.len(),
                "unreadable": analysis.unreadable.len(),
                "edges": analysis.graph.edge_count(),
                "resolution": analysis.resolution,
                "format": if self.pretty { "pretty" } else { "compact" }
            }),
        );
        output.insert(
            "key_modules".to_string(),
            serde_json::to_value(&analysis.key_modules)?,
        );
        output.insert("cycles".to_string(), serde_json::to_value(&analysis.cycles)?);
        output.insert("metrics".to_string(), serde_json::to_value(&analysis.metrics)?);
        output.insert(
            "visualization".to_string(),
            serde_json::to_value(&analysis.visualization)?,
        );
        output.insert(
            "dependencies".to_string(),
            serde_json::to_value(analysis.graph.forward())?,
        );
        output.insert(
            "dependents".to_string(),
            serde_json::to_value(analysis.graph.reverse())?,
        );
        output.insert("parse_failures".to_string(), Value::Array(parse_failures));
        output.insert(
            "unreadable".to_string(),
            serde_json::to_value(&analysis.unreadable)?,
        );
        if self.include_facts {
            output.insert("facts".to_string(), serde_json::to_value(&analysis.facts)?);
        }

        Ok(Value::Object(output))
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}
