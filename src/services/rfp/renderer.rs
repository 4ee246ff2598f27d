//! Markdown Rendering
//!
//! Renders a stored document as Markdown, grouped under the taxonomy headings.
//! Sections the document does not mention are rendered as missing.

use std::fmt::Write;

use rfp_forge_core::{TrustLevel, SECTIONS, SECTION_GROUPS};

use crate::models::rfp::{RfpDocument, RfpSection};

use super::mapping::PREVIEW_PLACEHOLDER;

fn trust_badge(level: TrustLevel) -> &'static str {
    match level {
        TrustLevel::Confirmed => "확정",
        TrustLevel::Inferred => "추론",
        TrustLevel::Pending => "보류",
        TrustLevel::Missing => "미정",
    }
}

pub fn render_markdown(project_name: &str, document: &RfpDocument) -> String {
    let mut out = String::new();
    let find = |id: &str| document.content.sections.iter().find(|s| s.id == id);

    // Writing into a String cannot fail
    let _ = writeln!(out, "# {} RFP", project_name);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "- 버전: {}\n- 작성 방식: {}\n- 완성도: {}% ({})\n- 최소 요건 충족: {}\n- 작성일: {}",
        document.version,
        document.mode.as_str(),
        document.completion_rate,
        document.completion_level.as_str(),
        if document.minimum_requirements_met { "예" } else { "아니요" },
        document.created_at
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "## 요약\n\n{}", document.content.summary);

    for group in SECTION_GROUPS.iter() {
        let _ = writeln!(out);
        let _ = writeln!(out, "## {} {}", group.id, group.name);

        for id in group.section_ids {
            let name = SECTIONS
                .iter()
                .find(|s| s.id == *id)
                .map(|s| s.name)
                .unwrap_or(*id);

            // single-leaf groups share the group heading
            if group.section_ids.len() > 1 {
                let _ = writeln!(out);
                let _ = writeln!(out, "### {} {}", id, name);
            }
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", render_body(find(*id)));
        }
    }

    out
}

fn render_body(section: Option<&RfpSection>) -> String {
    match section {
        Some(RfpSection {
            content: Some(content),
            trust_level,
            source_step,
            ..
        }) if !content.trim().is_empty() => {
            let source = source_step
                .map(|step| format!(", {}단계", step))
                .unwrap_or_default();
            format!("{}\n\n_({}{})_", content.trim(), trust_badge(*trust_level), source)
        }
        _ => format!("_{}_", PREVIEW_PLACEHOLDER),
    }
}
