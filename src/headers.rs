//! Resolves free-form spreadsheet header cells to the review fields they hold.

/// The semantic fields a review column can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    City,
    Service,
    Rating,
    Text,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Name,
        Field::City,
        Field::Service,
        Field::Rating,
        Field::Text,
    ];

    /// Accepted header spellings, already normalized.
    pub fn synonyms(self) -> &'static [&'static str] {
        SYNONYMS
            .iter()
            .find(|(field, _)| *field == self)
            .map(|(_, names)| *names)
            .unwrap_or_default()
    }
}

/// Header spellings per field. The long ones are the question titles of the
/// review form whose responses sheet is published as CSV.
pub const SYNONYMS: &[(Field, &[&str])] = &[
    (Field::Name, &["full name", "name"]),
    (Field::City, &["city location", "city", "location"]),
    (Field::Service, &["which service did you hire?", "service"]),
    (
        Field::Rating,
        &["how would you rate your experience?", "rating", "stars"],
    ),
    (
        Field::Text,
        &["please share your feedback", "review", "comment", "feedback"],
    ),
];

/// Lowercase, turn `/` (with any surrounding spaces) into a single space,
/// and collapse whitespace runs.
///
/// `"City / Location"` and `"city  location"` both become `"city location"`.
pub fn normalize_header(raw: &str) -> String {
    raw.to_lowercase()
        .split('/')
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Column index per field, `None` when no header cell matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeaderMap {
    pub name: Option<usize>,
    pub city: Option<usize>,
    pub service: Option<usize>,
    pub rating: Option<usize>,
    pub text: Option<usize>,
}

impl HeaderMap {
    /// Match each field against the header row. The first matching column wins.
    pub fn resolve<S: AsRef<str>>(header_row: &[S]) -> Self {
        let normalized: Vec<String> = header_row
            .iter()
            .map(|h| normalize_header(h.as_ref()))
            .collect();

        let find = |field: Field| {
            let names = field.synonyms();
            normalized.iter().position(|h| names.contains(&h.as_str()))
        };

        Self {
            name: find(Field::Name),
            city: find(Field::City),
            service: find(Field::Service),
            rating: find(Field::Rating),
            text: find(Field::Text),
        }
    }

    pub fn get(&self, field: Field) -> Option<usize> {
        match field {
            Field::Name => self.name,
            Field::City => self.city,
            Field::Service => self.service,
            Field::Rating => self.rating,
            Field::Text => self.text,
        }
    }

    /// Fields with no matching column.
    pub fn missing(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }
}
