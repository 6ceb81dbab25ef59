use super::domain::{ApplicationField, ApplicationFields, ValidationErrors};

/// Every field is required; the e-mail additionally needs a `local@domain` shape.
pub fn validate(fields: &ApplicationFields) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    for field in ApplicationField::ALL {
        let value = fields.get(field).trim();
        if value.is_empty() {
            errors.insert(field);
            continue;
        }

        if field == ApplicationField::Email && !is_basic_email(value) {
            errors.insert(field);
        }
    }

    errors
}

/// Loose check: one `@`, non-empty local part, and no whitespace anywhere. The
/// domain is dot-separated labels of ASCII letters, digits and `-`.
pub fn is_basic_email(value: &str) -> bool {
    let value = value.trim();
    if value.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }

    domain.split('.').all(|label| {
        !label.is_empty()
            && label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}
