use rptqa_core::{ObjectKind, ReportMetadata};

pub const MAX_SUGGESTIONS: usize = 6;

/// Which metadata category must be present for a template to apply.
#[derive(Debug, Clone, Copy)]
enum Requires {
    Tables,
    MultipleTables,
    FirstTable,
    Sections,
    Formulas,
    Parameters,
    ImageObjects,
}

/// Fixed priority order; templates are tried top to bottom until the list
/// reaches `MAX_SUGGESTIONS`.
const TEMPLATES: [(Requires, &str); 7] = [
    (Requires::Tables, "What data sources does this report use?"),
    (Requires::Sections, "What are the main sections of this report?"),
    (
        Requires::Formulas,
        "Show me all the calculated fields and formulas.",
    ),
    (
        Requires::MultipleTables,
        "How many different tables does this report pull from?",
    ),
    (Requires::FirstTable, "What fields come from the {table} table?"),
    (
        Requires::Parameters,
        "What parameters does this report expect at run time?",
    ),
    (
        Requires::ImageObjects,
        "What images or logos are included in this report?",
    ),
];

/// Template questions for a report, keyed by which metadata categories are
/// populated. Never fails; empty metadata yields an empty list.
pub fn suggest_questions(metadata: &ReportMetadata) -> Vec<String> {
    let has_images = metadata
        .sections
        .iter()
        .flat_map(|section| section.objects.iter())
        .any(|object| object.kind == ObjectKind::Image);

    let mut questions = Vec::new();
    for (requires, template) in TEMPLATES {
        if questions.len() == MAX_SUGGESTIONS {
            break;
        }
        match requires {
            Requires::Tables if !metadata.tables.is_empty() => {
                questions.push(template.to_string());
            }
            Requires::MultipleTables if metadata.tables.len() > 1 => {
                questions.push(template.to_string());
            }
            Requires::FirstTable => {
                if let Some(table) = metadata.tables.first() {
                    questions.push(template.replace("{table}", &table.name));
                }
            }
            Requires::Sections if !metadata.sections.is_empty() => {
                questions.push(template.to_string());
            }
            Requires::Formulas if !metadata.formulas.is_empty() => {
                questions.push(template.to_string());
            }
            Requires::Parameters if !metadata.parameters.is_empty() => {
                questions.push(template.to_string());
            }
            Requires::ImageObjects if has_images => {
                questions.push(template.to_string());
            }
            _ => {}
        }
    }
    questions
}
