use crate::messages::Notice;
use crate::prompt::{Field, FieldRequest};
use crate::response::ParsedResponse;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GeneratedCharacter {
    pub race: String,
    pub class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backstory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playstyle: Option<String>,
}

impl GeneratedCharacter {
    pub fn new(race: String, class: String) -> Self {
        Self {
            race,
            class,
            name: None,
            backstory: None,
            personality: None,
            playstyle: None,
        }
    }

    /// Copies the requested sections out of a parsed completion. A name is
    /// only kept when it is non-empty; the other sections are kept as-is.
    pub fn with_details(mut self, request: &FieldRequest, parsed: &ParsedResponse) -> Self {
        let text = |field| parsed.get(field).unwrap_or_default().to_string();
        for field in request.iter() {
            match field {
                Field::Name => self.name = Some(text(field)).filter(|n| !n.is_empty()),
                Field::Backstory => self.backstory = Some(text(field)),
                Field::Personality => self.personality = Some(text(field)),
                Field::Playstyle => self.playstyle = Some(text(field)),
            }
        }
        self
    }
}

impl fmt::Display for GeneratedCharacter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.race, self.class)?;
        if let Some(name) = &self.name {
            write!(f, "\n{}", name)?;
        }
        let sections = [
            ("Backstory", &self.backstory),
            ("Personality", &self.personality),
            ("Playstyle", &self.playstyle),
        ];
        for (label, value) in sections {
            if let Some(value) = value {
                let value = value.trim();
                let shown = if value.is_empty() {
                    Notice::NotGenerated.as_str()
                } else {
                    value
                };
                write!(f, "\n{}: {}", label, shown)?;
            }
        }
        Ok(())
    }
}

/// Characters produced by one generation run, in generation order.
#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq, Eq)]
#[serde(transparent)]
pub struct Batch {
    pub characters: Vec<GeneratedCharacter>,
}

impl Batch {
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::parse_response;

    #[test]
    fn test_plain_character_serializes_without_optionals() {
        let character = GeneratedCharacter::new("Elf".to_string(), "Wizard (Bladesinging)".to_string());
        let json = serde_json::to_string(&character).unwrap();
        assert_eq!(json, r#"{"race":"Elf","class":"Wizard (Bladesinging)"}"#);
        assert_eq!(character.to_string(), "Elf Wizard (Bladesinging)");
    }

    #[test]
    fn test_with_details_keeps_requested_sections() {
        let request = FieldRequest::new(true, true, false, true);
        let parsed = parse_response(Some("Name: Brom\nBackstory: A smith's son."), &request);

        let character = GeneratedCharacter::new("Dwarf".to_string(), "Fighter (Champion)".to_string())
            .with_details(&request, &parsed);

        assert_eq!(character.name.as_deref(), Some("Brom"));
        assert_eq!(character.backstory.as_deref(), Some("A smith's son."));
        assert_eq!(character.personality, None);
        assert_eq!(character.playstyle.as_deref(), Some(""));
        assert_eq!(
            character.to_string(),
            "Dwarf Fighter (Champion)\nBrom\nBackstory: A smith's son.\nPlaystyle: (not generated)"
        );
    }

    #[test]
    fn test_empty_name_is_dropped() {
        let request = FieldRequest::new(true, false, false, false);
        let parsed = parse_response(Some("Something else entirely"), &request);

        let character = GeneratedCharacter::new("Gnome".to_string(), "Rogue (Thief)".to_string())
            .with_details(&request, &parsed);
        assert_eq!(character.name, None);
    }

    #[test]
    fn test_batch_serializes_as_array() {
        let batch = Batch {
            characters: vec![GeneratedCharacter::new("Elf".to_string(), "Druid (Circle of the Moon)".to_string())],
        };
        let json = serde_json::to_string(&batch).unwrap();
        assert!(json.starts_with('['));
        assert_eq!(batch.len(), 1);
    }
}
