use crate::error::ArchiveErrorCode;

fn sanitize_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_sep = false;
    for ch in value.chars() {
        if ch.is_ascii_whitespace() {
            if !out.is_empty() && !prev_sep {
                out.push('_');
                prev_sep = true;
            }
        } else if ch.is_ascii_graphic() {
            out.push(ch);
            prev_sep = false;
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "na".to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn format_line(
    code: ArchiveErrorCode,
    stage: &str,
    unit: &str,
    action: &str,
    reason: &str,
) -> String {
    format!(
        "ARCHIVE_WARN code={} stage={} unit={} action={} reason={}",
        code.as_str(),
        sanitize_value(stage),
        sanitize_value(unit),
        sanitize_value(action),
        sanitize_value(reason),
    )
}

pub fn emit(code: ArchiveErrorCode, stage: &str, unit: &str, action: &str, reason: &str) {
    eprintln!("{}", format_line(code, stage, unit, action, reason));
}
