use regex::Regex;

/// One item parsed out of a `;`-delimited multivalue field.
///
/// Catalogers can disambiguate a name by suffixing it with a wikidata code in
/// braces, e.g. `"Douglas Adams {Q42}"`. Such an item becomes `Sourced`; the
/// code must terminate the item or the whole string stays a plain value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotatedValue {
    Plain(String),
    Sourced { name: String, code: String },
}

impl AnnotatedValue {
    /// The display text, without any wikidata suffix.
    pub fn name(&self) -> &str {
        match self {
            AnnotatedValue::Plain(name) => name,
            AnnotatedValue::Sourced { name, .. } => name,
        }
    }

    /// Reference URL for sourced values, `None` for plain ones.
    pub fn wikidata_url(&self) -> Option<String> {
        match self {
            AnnotatedValue::Plain(_) => None,
            AnnotatedValue::Sourced { code, .. } => {
                Some(format!("https://www.wikidata.org/wiki/{}", code))
            }
        }
    }
}

fn classify(item: &str) -> AnnotatedValue {
    let wikidata_regex = Regex::new(r"^(.*\S)\s+\{(Q\d+)\}$").unwrap();

    match wikidata_regex.captures(item) {
        Some(caps) => AnnotatedValue::Sourced {
            name: caps[1].trim().to_string(),
            code: caps[2].to_string(),
        },
        None => AnnotatedValue::Plain(item.to_string()),
    }
}

/// Splits a multivalue field on `;` and classifies each item, preserving the
/// input order. Empty input yields an empty vec; items that trim to nothing
/// (e.g. from a trailing `;`) are dropped.
pub fn split_multivalue(value: &str) -> Vec<AnnotatedValue> {
    if value.trim().is_empty() {
        return Vec::new();
    }

    value
        .split(';')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(classify)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_classifies_mixed_items() {
        let values = split_multivalue("A; B {Q42}; C");
        assert_eq!(
            values,
            vec![
                AnnotatedValue::Plain("A".to_string()),
                AnnotatedValue::Sourced {
                    name: "B".to_string(),
                    code: "Q42".to_string(),
                },
                AnnotatedValue::Plain("C".to_string()),
            ]
        );
        assert_eq!(
            values[1].wikidata_url().as_deref(),
            Some("https://www.wikidata.org/wiki/Q42")
        );
    }

    #[test]
    fn empty_input_yields_no_items() {
        assert!(split_multivalue("").is_empty());
        assert!(split_multivalue("   ").is_empty());
    }

    #[test]
    fn trailing_separator_adds_nothing() {
        let values = split_multivalue("one;two;");
        assert_eq!(values.len(), 2);
        assert_eq!(values[1].name(), "two");
    }

    #[test]
    fn wikidata_code_must_terminate_the_item() {
        assert_eq!(
            classify("B {Q42} trailing"),
            AnnotatedValue::Plain("B {Q42} trailing".to_string())
        );
        assert_eq!(
            classify("Braces {not a code}"),
            AnnotatedValue::Plain("Braces {not a code}".to_string())
        );
    }

    #[test]
    fn sourced_name_is_trimmed() {
        let values = split_multivalue("topics here;  Douglas Adams   {Q42}");
        assert_eq!(
            values[1],
            AnnotatedValue::Sourced {
                name: "Douglas Adams".to_string(),
                code: "Q42".to_string(),
            }
        );
    }

    #[test]
    fn plain_values_have_no_url() {
        assert_eq!(classify("just text").wikidata_url(), None);
    }
}
