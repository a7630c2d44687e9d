use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use thiserror::Error;

pub const SUBZONE_LABEL: &str = "SUBZONE_N";
pub const PLANNING_AREA_LABEL: &str = "PLN_AREA_N";
pub const REGION_LABEL: &str = "REGION_N";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DescriptionError {
    #[error("description table is missing required field {0}")]
    MissingField(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubzoneAttributes {
    pub subzone_name: String,
    pub planning_area: String,
    pub region: String,
}

impl SubzoneAttributes {
    pub fn from_description(html: &str) -> Result<Self, DescriptionError> {
        let mut table = parse_attribute_table(html);
        let mut take = |label: &'static str| {
            table
                .remove(label)
                .ok_or(DescriptionError::MissingField(label))
        };

        Ok(Self {
            subzone_name: take(SUBZONE_LABEL)?,
            planning_area: take(PLANNING_AREA_LABEL)?,
            region: take(REGION_LABEL)?,
        })
    }
}

fn row_start_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<tr\b[^>]*>").expect("valid regex"))
}

// end tags are optional, so a row also stops at the end of the table
fn row_end_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)</(?:tr|table)\s*>").expect("valid regex"))
}

fn cell_start_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<t([hd])\b[^>]*>").expect("valid regex"))
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"))
}

pub fn parse_attribute_table(html: &str) -> HashMap<String, String> {
    let mut attributes = HashMap::new();
    let starts: Vec<_> = row_start_re().find_iter(html).collect();

    for (i, start) in starts.iter().enumerate().skip(1) {
        let next = starts.get(i + 1).map_or(html.len(), |m| m.start());
        let mut body = &html[start.end()..next];
        if let Some(end) = row_end_re().find(body) {
            body = &body[..end.start()];
        }

        if let (Some(label), Some(value)) = row_pair(body) {
            attributes.insert(label, value);
        }
    }

    attributes
}

// First header cell and first data cell of a row. A cell runs to the next cell or the row end.
fn row_pair(row: &str) -> (Option<String>, Option<String>) {
    let cells: Vec<(bool, usize, usize)> = cell_start_re()
        .captures_iter(row)
        .filter_map(|c| {
            let tag = c.get(0)?;
            Some((c[1].eq_ignore_ascii_case("h"), tag.start(), tag.end()))
        })
        .collect();

    let mut label = None;
    let mut value = None;
    for (i, &(is_header, _, content_start)) in cells.iter().enumerate() {
        let content_end = cells.get(i + 1).map_or(row.len(), |&(_, s, _)| s);
        let slot = if is_header { &mut label } else { &mut value };
        if slot.is_none() {
            *slot = Some(cell_text(&row[content_start..content_end]));
        }
    }

    (label, value)
}

fn cell_text(inner: &str) -> String {
    let stripped = tag_re().replace_all(inner, "");
    decode_entities(&stripped).trim().to_string()
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    // &amp; last, so "&amp;lt;" stays "&lt;"
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"<center><table><tr><th colspan='2' align='center'><em>Attributes</em></th></tr><tr bgcolor="#E3E3F3"> <th>SUBZONE_NO</th> <td>1</td> </tr><tr bgcolor=""> <th>SUBZONE_N</th> <td>MARINA EAST</td> </tr><tr bgcolor="#E3E3F3"> <th>PLN_AREA_N</th> <td>MARINA EAST</td> </tr><tr bgcolor=""> <th>REGION_N</th> <td> CENTRAL REGION </td> </tr></table></center>"##;

    #[test]
    fn parses_rows_after_header() {
        let table = parse_attribute_table(SAMPLE);

        assert_eq!(table.get("SUBZONE_NO").map(String::as_str), Some("1"));
        assert_eq!(table.get("REGION_N").map(String::as_str), Some("CENTRAL REGION"));
        assert!(!table.contains_key("Attributes"));
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn first_row_is_discarded_even_when_it_is_a_pair() {
        let html = "<table><tr><th>A</th><td>1</td></tr><tr><th>B</th><td>2</td></tr></table>";
        let table = parse_attribute_table(html);

        assert!(!table.contains_key("A"));
        assert_eq!(table.get("B").map(String::as_str), Some("2"));
    }

    #[test]
    fn strips_nested_markup_and_decodes_entities() {
        let html = "<table><tr><th>h</th></tr><tr><th><b>SUBZONE_N</b></th><td><i>KAKI BUKIT &amp; ONE</i></td></tr></table>";
        let table = parse_attribute_table(html);

        assert_eq!(table.get("SUBZONE_N").map(String::as_str), Some("KAKI BUKIT & ONE"));
    }

    #[test]
    fn typed_attributes_from_description() {
        let attrs = SubzoneAttributes::from_description(SAMPLE).expect("all fields present");

        assert_eq!(
            attrs,
            SubzoneAttributes {
                subzone_name: "MARINA EAST".to_string(),
                planning_area: "MARINA EAST".to_string(),
                region: "CENTRAL REGION".to_string(),
            }
        );
    }

    #[test]
    fn omitted_end_tags_still_yield_rows() {
        let html = "<table><tr><th>Attributes</th><tr><th>SUBZONE_N<td>A<tr><th>PLN_AREA_N<td>B<tr><th>REGION_N<td>C</table>";
        let table = parse_attribute_table(html);

        assert_eq!(table.get("SUBZONE_N").map(String::as_str), Some("A"));
        assert_eq!(table.get("PLN_AREA_N").map(String::as_str), Some("B"));
        assert_eq!(table.get("REGION_N").map(String::as_str), Some("C"));
        assert_eq!(table.len(), 3);

        let attrs = SubzoneAttributes::from_description(html).expect("all fields present");
        assert_eq!(attrs.region, "C");
    }

    #[test]
    fn text_after_the_table_is_not_part_of_the_last_row() {
        let html = "<table><tr><th>h</th></tr><tr><th>REGION_N</th><td>WEST REGION</table><p>footer</p>";
        let table = parse_attribute_table(html);

        assert_eq!(table.get("REGION_N").map(String::as_str), Some("WEST REGION"));
    }

    #[test]
    fn missing_field_is_reported_by_label() {
        let html = "<table><tr><th>h</th></tr><tr><th>SUBZONE_N</th><td>X</td></tr><tr><th>REGION_N</th><td>Y</td></tr></table>";

        assert_eq!(
            SubzoneAttributes::from_description(html),
            Err(DescriptionError::MissingField(PLANNING_AREA_LABEL))
        );
        assert_eq!(
            SubzoneAttributes::from_description(""),
            Err(DescriptionError::MissingField(SUBZONE_LABEL))
        );
    }
}
