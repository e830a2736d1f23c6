use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// A destination address reduced to bare digits, as the providers expect.
/// Parsing strips formatting characters and an international prefix; what
/// remains must be 8 to 15 digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedAddress(String);

impl NormalizedAddress {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let digits: String = raw
            .trim()
            .trim_start_matches('+')
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();
        let stripped: String = raw
            .trim()
            .trim_start_matches('+')
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
            .collect();
        if stripped != digits {
            return Err(DomainError::Validation(format!(
                "address '{raw}' contains non-numeric characters"
            )));
        }
        if !(8..=15).contains(&digits.len()) {
            return Err(DomainError::Validation(format!(
                "address '{raw}' must contain 8 to 15 digits"
            )));
        }
        Ok(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NormalizedAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Substitute `{{key}}` placeholders with the given variables. Placeholders
/// with no matching variable are left verbatim so a misconfigured template
/// stays visible in the delivered text instead of failing the send.
pub fn render_template(template: &str, variables: &HashMap<String, String>) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find("{{") {
        rendered.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        match after.find("}}") {
            Some(close) => {
                let key = after[..close].trim();
                match variables.get(key) {
                    Some(value) => rendered.push_str(value),
                    None => rendered.push_str(&rest[open..open + 2 + close + 2]),
                }
                rest = &after[close + 2..];
            }
            None => {
                rendered.push_str(&rest[open..]);
                return rendered;
            }
        }
    }
    rendered.push_str(rest);
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_formatted_phone_numbers() {
        let addr = NormalizedAddress::parse("+55 (11) 98765-4321").unwrap();
        assert_eq!(addr.as_str(), "5511987654321");
    }

    #[test]
    fn rejects_short_and_alphabetic_addresses() {
        assert!(NormalizedAddress::parse("12345").is_err());
        assert!(NormalizedAddress::parse("not-a-number").is_err());
        assert!(NormalizedAddress::parse("").is_err());
    }

    #[test]
    fn substitutes_known_placeholders() {
        let vars = HashMap::from([("name".to_string(), "Ana".to_string())]);
        assert_eq!(
            render_template("Hi {{name}}, welcome!", &vars),
            "Hi Ana, welcome!"
        );
    }

    #[test]
    fn unresolved_placeholders_stay_verbatim() {
        let vars = HashMap::from([("name".to_string(), "Ana".to_string())]);
        assert_eq!(
            render_template("Hi {{name}}, your code is {{code}}", &vars),
            "Hi Ana, your code is {{code}}"
        );
    }

    #[test]
    fn unterminated_placeholder_is_kept() {
        let vars = HashMap::new();
        assert_eq!(render_template("broken {{tail", &vars), "broken {{tail");
    }
}
