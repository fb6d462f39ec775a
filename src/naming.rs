//! Naming conventions for generated members, accessors and classes.
use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::GenerationConfig;
use crate::error::ConfigurationError;
use crate::ir::GeneratedType;

static ILLEGAL_CHARACTERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9A-Za-z_$]").expect("static identifier pattern"));

#[derive(Debug, Clone)]
pub struct NameHelper {
    delimiters: Vec<char>,
    reserved: HashSet<String>,
}

impl NameHelper {
    pub fn new(config: &GenerationConfig) -> Self {
        Self {
            delimiters: config.property_word_delimiters.chars().collect(),
            reserved: config.reserved_identifiers.iter().cloned().collect(),
        }
    }

    pub fn replace_illegal_characters(&self, name: &str) -> String {
        ILLEGAL_CHARACTERS.replace_all(name, "_").into_owned()
    }

    /// `first-name` → `firstName`: every letter after a delimiter is upper-cased,
    /// the first character is left alone, delimiters are dropped.
    pub fn capitalize_trailing_words(&self, name: &str) -> String {
        if !name.chars().any(|c| self.delimiters.contains(&c)) {
            return name.to_string();
        }
        let mut out = String::with_capacity(name.len());
        let mut after_delimiter = false;
        for (i, c) in name.chars().enumerate() {
            if self.delimiters.contains(&c) {
                after_delimiter = true;
                continue;
            }
            if i > 0 && after_delimiter {
                out.extend(c.to_uppercase());
            } else {
                out.push(c);
            }
            after_delimiter = false;
        }
        out
    }

    /// Member name for a schema property.
    pub fn property_name(&self, json_name: &str) -> Result<String, ConfigurationError> {
        let name = self.replace_illegal_characters(json_name);
        let name = self.capitalize_trailing_words(&name);
        let mut name = decapitalize(&name);
        if name.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            name.insert(0, '_');
        }
        if name.is_empty() {
            return Err(ConfigurationError::EmptyIdentifier { property: json_name.to_string() });
        }
        if self.reserved.contains(&name) {
            return Err(ConfigurationError::ReservedIdentifier {
                property: json_name.to_string(),
                identifier: name,
            });
        }
        Ok(name)
    }

    pub fn getter_name(&self, json_name: &str, ty: &GeneratedType) -> Result<String, ConfigurationError> {
        let prefix = if ty.is_boolean() { "is" } else { "get" };
        Ok(format!("{prefix}{}", capitalize(&self.property_name(json_name)?)))
    }

    pub fn setter_name(&self, json_name: &str) -> Result<String, ConfigurationError> {
        Ok(format!("set{}", capitalize(&self.property_name(json_name)?)))
    }

    /// `with<Name>` for an already-derived member name.
    pub fn builder_name(&self, member_name: &str) -> String {
        let name = self.replace_illegal_characters(member_name);
        format!("with{}", capitalize(&self.capitalize_trailing_words(&name)))
    }

    pub fn class_name(&self, hint: &str) -> String {
        let name = self.replace_illegal_characters(hint);
        let mut name = capitalize(&self.capitalize_trailing_words(&name));
        if name.is_empty() {
            return "Unnamed".to_string();
        }
        if name.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            name.insert(0, '_');
        }
        name
    }
}

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Naive English singular, used to name the element class of a collection.
pub fn singular(s: &str) -> String {
    if let Some(stem) = s.strip_suffix("ies").filter(|stem| !stem.is_empty()) {
        format!("{stem}y")
    } else if s.ends_with('s') && !s.ends_with("ss") && s.len() > 1 {
        s[..s.len() - 1].to_string()
    } else {
        s.to_string()
    }
}

/// Lower-case the first character unless the second is upper-case (`URL` stays).
fn decapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(_), Some(second)) if second.is_uppercase() => s.to_string(),
        (Some(first), _) => first.to_lowercase().collect::<String>() + &s[first.len_utf8()..],
        (None, _) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn helper() -> NameHelper {
        NameHelper::new(&GenerationConfig::default())
    }

    #[test]
    fn property_names() {
        let h = helper();
        assert_eq!(h.property_name("first-name").unwrap(), "firstName");
        assert_eq!(h.property_name("first name").unwrap(), "firstName");
        assert_eq!(h.property_name("Title").unwrap(), "title");
        assert_eq!(h.property_name("URL").unwrap(), "URL");
        assert_eq!(h.property_name("_localId").unwrap(), "localId");
        assert_eq!(h.property_name("1st").unwrap(), "_1st");
        assert_eq!(h.property_name("a.b").unwrap(), "aB");
    }

    #[test]
    fn rejected_names() {
        let h = helper();
        assert!(matches!(h.property_name("---"), Err(ConfigurationError::EmptyIdentifier { .. })));
        assert!(matches!(h.property_name(""), Err(ConfigurationError::EmptyIdentifier { .. })));
        assert!(matches!(
            h.property_name("class"),
            Err(ConfigurationError::ReservedIdentifier { .. })
        ));
    }

    #[test]
    fn accessor_and_builder_names() {
        let h = helper();
        let string = GeneratedType::primitive("string");
        let boolean = GeneratedType::primitive("boolean");
        assert_eq!(h.getter_name("first-name", &string).unwrap(), "getFirstName");
        assert_eq!(h.getter_name("active", &boolean).unwrap(), "isActive");
        assert_eq!(h.setter_name("first-name").unwrap(), "setFirstName");
        assert_eq!(h.builder_name("firstName"), "withFirstName");
    }

    #[test]
    fn class_names() {
        let h = helper();
        assert_eq!(h.class_name("billing-address"), "BillingAddress");
        assert_eq!(h.class_name("selfRefs"), "SelfRefs");
        assert_eq!(h.class_name(""), "Unnamed");
        assert_eq!(h.class_name(&singular("things")), "Thing");
        assert_eq!(singular("categories"), "category");
        assert_eq!(singular("address"), "address");
    }
}
