use rptqa_core::{ObjectKind, ReportMetadata};

/// Hard cap on the rendered context block. Truncation drops whole lines, so
/// the block never ends mid-entity, and appends a marker line. The cap keeps
/// prompt size bounded no matter how large the parsed report is.
pub const MAX_CONTEXT_CHARS: usize = 6000;

const TRUNCATION_MARKER: &str = "... (metadata truncated)";

/// Render report metadata into the plain-text context block fed to the model.
/// Total and deterministic: empty collections are omitted, never errors.
pub fn build_context(metadata: &ReportMetadata) -> String {
    let mut lines = Vec::new();

    let display_name = if metadata.info.name.is_empty() {
        metadata.report_id.as_str()
    } else {
        metadata.info.name.as_str()
    };
    lines.push(format!("REPORT: {display_name}"));
    lines.push(format!("Id: {}", metadata.report_id));
    if !metadata.info.file_path.is_empty() {
        lines.push(format!("File: {}", metadata.info.file_path));
    }
    if let Some(size) = metadata.info.file_size {
        lines.push(format!("Size: {size} bytes"));
    }
    if let Some(version) = &metadata.info.tool_version {
        lines.push(format!("Tool version: {version}"));
    }

    if !metadata.tables.is_empty() {
        lines.push("TABLES:".to_string());
        for table in &metadata.tables {
            if table.location.is_empty() {
                lines.push(format!("- {}", table.name));
            } else {
                lines.push(format!("- {} (location {})", table.name, table.location));
            }
        }
    }

    if !metadata.parameters.is_empty() {
        lines.push("PARAMETERS:".to_string());
        for parameter in &metadata.parameters {
            let default = if parameter.has_current_value {
                "default set"
            } else {
                "no default"
            };
            lines.push(format!(
                "- {} (type {}, {default})",
                parameter.name, parameter.value_type
            ));
        }
    }

    if !metadata.formulas.is_empty() {
        lines.push("FORMULAS:".to_string());
        for formula in &metadata.formulas {
            match &formula.text {
                Some(text) => lines.push(format!("- {}: {}", formula.name, text.trim())),
                None => lines.push(format!("- {}: (definition unavailable)", formula.name)),
            }
        }
    }

    if !metadata.sections.is_empty() {
        lines.push("SECTIONS:".to_string());
        for section in &metadata.sections {
            let mut text = 0usize;
            let mut field = 0usize;
            let mut image = 0usize;
            for object in &section.objects {
                match object.kind {
                    ObjectKind::Text => text += 1,
                    ObjectKind::Field => field += 1,
                    ObjectKind::Image => image += 1,
                    ObjectKind::Other => {}
                }
            }
            lines.push(format!(
                "- {} (height {}): {text} text, {field} field, {image} image objects",
                section.kind, section.height
            ));
        }
    }

    join_capped(&lines, MAX_CONTEXT_CHARS)
}

/// Join lines with newlines, stopping before the output would cross `cap`.
/// Room for the marker line is reserved up front, so the result length never
/// exceeds the cap even when truncation kicks in.
fn join_capped(lines: &[String], cap: usize) -> String {
    let reserve = TRUNCATION_MARKER.len() + 1;
    let mut out = String::new();
    let mut truncated = false;
    for line in lines {
        if out.len() + line.len() + 1 + reserve > cap {
            truncated = true;
            break;
        }
        out.push_str(line);
        out.push('\n');
    }
    if truncated {
        out.push_str(TRUNCATION_MARKER);
        out.push('\n');
    }
    out
}
