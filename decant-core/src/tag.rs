use crate::Field;

/// Parsed form of a field annotation such as `#[json = "name,string"]`.
///
/// | Annotation | Effect |
/// |---|---|
/// | absent | the declared field name is the JSON key |
/// | `name` | `name` is the JSON key |
/// | `-` | the field is never decoded |
/// | `-,` | the JSON key is a literal `-` |
/// | `,string` | the scalar value arrives wrapped in a JSON string |
///
/// Unknown options are ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FieldTag<'a> {
    /// Explicit JSON key, if the annotation has one.
    pub name: Option<&'a str>,
    /// The field is excluded from decoding.
    pub skip: bool,
    /// The value is a scalar wrapped in a JSON string, e.g. `"100"`.
    pub string: bool,
}

impl<'a> FieldTag<'a> {
    /// Parse an annotation. `None` yields the default tag.
    pub fn parse(tag: Option<&'a str>) -> Self {
        let Some(tag) = tag else {
            return FieldTag::default();
        };
        if tag == "-" {
            return FieldTag {
                skip: true,
                ..FieldTag::default()
            };
        }

        let mut parts = tag.split(',');
        let name = parts.next().filter(|name| !name.is_empty());
        let mut parsed = FieldTag {
            name,
            ..FieldTag::default()
        };
        for option in parts {
            if option == "string" {
                parsed.string = true;
            }
        }
        parsed
    }

    /// Parse the annotation carried by `field`.
    pub fn of(field: &'a Field) -> Self {
        Self::parse(field.tag)
    }

    /// The JSON key to match: the explicit name, or `declared` if none.
    pub fn key_or<'b>(&self, declared: &'b str) -> &'b str
    where
        'a: 'b,
    {
        self.name.unwrap_or(declared)
    }
}
