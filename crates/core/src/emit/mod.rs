//! Render the generated C# source file for one translation unit.
//!
//! Body lines are written without added indentation so the baseline reader
//! gets back exactly the text that was emitted.

use crate::catalog::Catalog;
use crate::model::{InlineFunctionUnit, TranslationResult};

/// Marker line written after every function body.
pub const HASH_MARKER: &str = "// original body hash:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    pub namespace: String,
    pub type_name: String,
    pub file_header: Option<String>,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            namespace: "FFmpeg.AutoGen".to_string(),
            type_name: "ffmpeg".to_string(),
            file_header: None,
        }
    }
}

/// One function to write: the unit, its outcome and an optional doc summary.
#[derive(Debug, Clone, Copy)]
pub struct EmittedFunction<'a> {
    pub unit: &'a InlineFunctionUnit,
    pub result: &'a TranslationResult,
    pub summary: Option<&'a str>,
}

pub fn render_file(
    options: &EmitOptions,
    catalog: &Catalog,
    functions: &[EmittedFunction<'_>],
) -> String {
    let mut out = String::new();
    if let Some(header) = options.file_header.as_deref().filter(|h| !h.trim().is_empty()) {
        for line in header.lines() {
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
    }
    out.push_str("using System;\n\n");
    out.push_str(&format!("namespace {};\n\n", options.namespace));
    out.push_str(&format!("public static unsafe partial class {}\n{{\n", options.type_name));

    for function in functions {
        render_function(&mut out, catalog, function);
    }

    out.push_str("}\n");
    out
}

fn render_function(out: &mut String, catalog: &Catalog, function: &EmittedFunction<'_>) {
    let signature = &function.unit.signature;
    if let Some(summary) = function.summary.map(str::trim).filter(|s| !s.is_empty()) {
        out.push_str(&format!("    /// <summary>{}</summary>\n", xml_escape(summary)));
    }
    let params: Vec<String> = signature
        .parameters
        .iter()
        .map(|p| format!("{} @{}", catalog.target_type(&p.ty), p.name))
        .collect();
    out.push_str(&format!(
        "    public static {} {}({})\n",
        catalog.target_type(&signature.return_type),
        signature.name,
        params.join(", ")
    ));
    for line in function.result.emitted_body().lines() {
        if line.trim().is_empty() {
            continue;
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out.push_str(&format!("    {HASH_MARKER} {}\n", function.unit.body_hash));
    out.push('\n');
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
