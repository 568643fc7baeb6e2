use crate::archive::config::RenderOptions;
use crate::archive::keys::MonthKey;
use crate::archive::record::DailyRecord;
use crate::archive::store::MonthlyAggregate;

pub const CELLS_PER_ROW: usize = 4;

const TABLE_HEADER: &str = "| | | | |\n";
const TABLE_ALIGN: &str = concat!(
    "|:-------------------------:|:-------------------------:",
    "|:-------------------------:|:-------------------------:|\n"
);

/// Render one month as a gallery page, oldest day first.
pub fn render_gallery(
    month: &MonthKey,
    aggregate: &MonthlyAggregate,
    opts: &RenderOptions,
) -> String {
    let mut out = format!("# {} - {}\n\n", opts.gallery_title, month.display_name());
    out.push_str(&render_table(aggregate.values(), opts));
    out
}

/// Render records into the four-column table, in the order given.
pub fn render_table<'a>(
    records: impl IntoIterator<Item = &'a DailyRecord>,
    opts: &RenderOptions,
) -> String {
    let mut out = String::new();
    out.push_str(TABLE_HEADER);
    out.push_str(TABLE_ALIGN);

    let cells = records
        .into_iter()
        .map(|record| render_cell(record, opts))
        .collect::<Vec<_>>();
    for row in cells.chunks(CELLS_PER_ROW) {
        let mut padded = row.to_vec();
        padded.resize(CELLS_PER_ROW, String::new());
        out.push_str(&format!("| {} |\n", padded.join(" | ")));
    }
    out
}

pub fn render_cell(record: &DailyRecord, opts: &RenderOptions) -> String {
    let label = escape_attr(record.display_title());
    let url = escape_url(&record.image_url);
    let preview = preview_url(&url, opts);
    format!(
        concat!(
            "<a href=\"{url}\" target=\"_blank\">",
            "<img src=\"{preview}\" width=\"{w}\" height=\"{h}\" ",
            "alt=\"{label}\" title=\"{label}\">",
            "</a><br>{date}<br>"
        ),
        url = url,
        preview = preview,
        w = opts.thumb_width,
        h = opts.thumb_height,
        label = label,
        date = escape_attr(&record.date),
    )
}

/// Thumbnail source for a record. Known CDN hosts get a width hint so the
/// preview stays small; the link target always keeps the full asset.
pub fn preview_url(url: &str, opts: &RenderOptions) -> String {
    let Some(host) = url_host(url) else {
        return url.to_string();
    };
    let known = opts
        .preview_hosts
        .iter()
        .any(|pattern| host == pattern.as_str() || host.ends_with(&format!(".{pattern}")));
    if !known {
        return url.to_string();
    }
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}w={}", opts.preview_width)
}

fn url_host(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next()?;
    let host = authority.rsplit('@').next()?;
    let host = host.split(':').next()?;
    if host.is_empty() { None } else { Some(host) }
}

/// Percent-encode the characters that would end the attribute or the table
/// cell. `&` stays as is so query strings are unchanged.
fn escape_url(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '"' => out.push_str("%22"),
            '<' => out.push_str("%3C"),
            '>' => out.push_str("%3E"),
            '|' => out.push_str("%7C"),
            ' ' => out.push_str("%20"),
            '\n' | '\r' => {}
            _ => out.push(ch),
        }
    }
    out
}

/// Labels land inside an HTML attribute inside a markdown table cell.
fn escape_attr(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '|' => out.push_str("&#124;"),
            '\n' | '\r' => out.push(' '),
            _ => out.push(ch),
        }
    }
    out
}
