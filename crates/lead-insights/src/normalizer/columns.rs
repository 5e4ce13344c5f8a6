//! Header role inference for spreadsheet columns.

/// The lead field a spreadsheet column feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadField {
    ClientName,
    Status,
    InRadius,
    Tag,
    CreatedAt,
}

// Checked in order; the first rule that matches a header decides its field.
const FIELD_RULES: &[(LeadField, &[&str])] = &[
    (LeadField::ClientName, &["client", "name"]),
    (LeadField::Status, &["status"]),
    (LeadField::InRadius, &["radius"]),
    (LeadField::Tag, &["tag", "category"]),
    (LeadField::CreatedAt, &["date", "created"]),
];

/// Infer which lead field a header belongs to by substring match on the
/// lowercased, trimmed header name.
pub(crate) fn infer_field(header: &str) -> Option<LeadField> {
    let header_lower = header.trim().to_lowercase();

    FIELD_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| header_lower.contains(k)))
        .map(|(field, _)| *field)
}

/// Resolved column positions for each lead field.
///
/// When several headers map to the same field the last one wins, so
/// `["Tag", "Category"]` reads the tag from the second column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    pub client_name: Option<usize>,
    pub status: Option<usize>,
    pub in_radius: Option<usize>,
    pub tag: Option<usize>,
    pub created_at: Option<usize>,
}

impl ColumnMapping {
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Self {
        let mut mapping = ColumnMapping::default();

        for (idx, header) in headers.iter().enumerate() {
            let slot = match infer_field(header.as_ref()) {
                Some(LeadField::ClientName) => &mut mapping.client_name,
                Some(LeadField::Status) => &mut mapping.status,
                Some(LeadField::InRadius) => &mut mapping.in_radius,
                Some(LeadField::Tag) => &mut mapping.tag,
                Some(LeadField::CreatedAt) => &mut mapping.created_at,
                None => continue,
            };
            *slot = Some(idx);
        }

        mapping
    }

    /// Whether the header set carried an explicit radius column.
    pub fn has_radius_column(&self) -> bool {
        self.in_radius.is_some()
    }
}
