use serde::Serialize;

use crate::config::ConfigFile;
use crate::output::Outputable;
use crate::query::params::{BoundValues, PlaceholderStyle};
use crate::query::{CompiledQuery, QueryRequest, QuerySource};

/// A compiled request: the data statement and, when asked for, its count
/// statement.
#[derive(Debug, Clone, Serialize)]
pub struct CompileResult {
    pub entity: String,
    pub query: CompiledQuery,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<CompiledQuery>,
}

impl CompileResult {
    /// Compile `request` against the configured mapping of its entity.
    pub fn compile(
        request: &QueryRequest,
        config: &ConfigFile,
        with_count: bool,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let ctx = config.context(request.entity())?;
        let (query, count) = if with_count {
            let (query, count) = request.compile_with_count(&ctx)?;
            (query, Some(count))
        } else {
            (request.compile(&ctx)?, None)
        };

        Ok(Self {
            entity: request.entity().to_string(),
            query,
            count,
        })
    }
}

fn format_query(lines: &mut Vec<String>, query: &CompiledQuery) {
    lines.push(query.statement.clone());

    if query.params.is_empty() {
        lines.push("Parameters: none".to_string());
        return;
    }

    let style = match query.style {
        PlaceholderStyle::Positional => "positional",
        PlaceholderStyle::Named => "named",
    };
    lines.push(format!("Parameters ({}):", style));
    match &query.params {
        BoundValues::Positional(values) => {
            for (idx, value) in values.iter().enumerate() {
                lines.push(format!("  ${} = {}", idx + 1, value.to_literal()));
            }
        }
        BoundValues::Named(values) => {
            for (name, value) in values {
                lines.push(format!("  ${} = {}", name, value.to_literal()));
            }
        }
    }
}

impl Outputable for CompileResult {
    fn to_text(&self) -> String {
        let mut lines = Vec::new();
        format_query(&mut lines, &self.query);

        if let Some(count) = &self.count {
            lines.push(String::new());
            lines.push("Count:".to_string());
            format_query(&mut lines, count);
        }

        lines.join("\n")
    }
}
