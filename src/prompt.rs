use std::collections::BTreeSet;
use std::fmt;

/// A section the completion can be asked to write. Variant order is the
/// order sections appear in the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Backstory,
    Personality,
    Playstyle,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::Name,
        Field::Backstory,
        Field::Personality,
        Field::Playstyle,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Backstory => "Backstory",
            Field::Personality => "Personality",
            Field::Playstyle => "Playstyle",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Backstory => "backstory",
            Field::Personality => "personality",
            Field::Playstyle => "playstyle",
        }
    }

    pub fn instruction(self) -> &'static str {
        match self {
            Field::Name => "Generate a fitting fantasy name.",
            Field::Backstory => "Write a concise 3-sentence backstory.",
            Field::Personality => "Write a tight 2-sentence personality description.",
            Field::Playstyle => {
                "Write a 2 sentence playstyle summary: combat approach, strengths, and typical tactics."
            }
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The set of sections requested for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRequest {
    fields: BTreeSet<Field>,
}

impl FieldRequest {
    pub fn new(name: bool, backstory: bool, personality: bool, playstyle: bool) -> Self {
        let flags = [name, backstory, personality, playstyle];
        Field::ALL
            .into_iter()
            .zip(flags)
            .filter(|(_, on)| *on)
            .map(|(field, _)| field)
            .collect()
    }

    pub fn all() -> Self {
        Field::ALL.into_iter().collect()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Requested fields in prompt order.
    pub fn iter(&self) -> impl Iterator<Item = Field> + '_ {
        self.fields.iter().copied()
    }
}

impl FromIterator<Field> for FieldRequest {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

const FORBID_NAMES: &str = " Do not invent or include proper names of nouns in your response. \
Refer to the character generically (e.g., 'this character', 'they'). \
Do not start any sentences with a personal name.";

const FORMAT_DIRECTIVE: &str =
    "Label each generated part exactly as shown below and do not use bold or markdown formatting:";

/// Builds the single user message sent to the completion service.
pub fn build_prompt(race: &str, class_subclass: &str, request: &FieldRequest, theme: &str) -> String {
    let theme = theme.trim();
    let theme_clause = if theme.is_empty() {
        String::new()
    } else {
        format!(" in this theme: '{}'", theme)
    };

    let tasks = request
        .iter()
        .map(Field::instruction)
        .collect::<Vec<_>>()
        .join(" ");
    let template = request
        .iter()
        .map(|f| format!("{}: <text>", f.label()))
        .collect::<Vec<_>>()
        .join("\n");
    let forbid = if request.contains(Field::Name) {
        ""
    } else {
        FORBID_NAMES
    };

    format!(
        "Complete the following tasks for a TTRPG character who is a(n) {} {}{}. {}{} {}\n{}",
        race, class_subclass, theme_clause, tasks, forbid, FORMAT_DIRECTIVE, template
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template_lines(prompt: &str) -> Vec<&str> {
        prompt
            .lines()
            .filter(|line| line.ends_with(": <text>"))
            .collect()
    }

    #[test]
    fn test_full_prompt_text() {
        let prompt = build_prompt(
            "Elf",
            "Wizard (School of Evocation)",
            &FieldRequest::new(true, true, false, false),
            "  gothic horror ",
        );

        assert_eq!(
            prompt,
            "Complete the following tasks for a TTRPG character who is a(n) Elf Wizard (School of Evocation) \
in this theme: 'gothic horror'. Generate a fitting fantasy name. Write a concise 3-sentence backstory. \
Label each generated part exactly as shown below and do not use bold or markdown formatting:\n\
Name: <text>\n\
Backstory: <text>"
        );
    }

    #[test]
    fn test_one_template_line_per_requested_field() {
        for mask in 0u8..16 {
            let request = FieldRequest::new(
                mask & 1 != 0,
                mask & 2 != 0,
                mask & 4 != 0,
                mask & 8 != 0,
            );
            let prompt = build_prompt("Dwarf", "Cleric (Life Domain)", &request, "");
            let lines = template_lines(&prompt);

            let expected: Vec<String> = request
                .iter()
                .map(|f| format!("{}: <text>", f.label()))
                .collect();
            assert_eq!(lines, expected, "mask {}", mask);

            for field in Field::ALL {
                if !request.contains(field) {
                    assert!(!prompt.contains(&format!("{}: <text>", field.label())));
                    assert!(!prompt.contains(field.instruction()));
                }
            }
        }
    }

    #[test]
    fn test_forbid_names_only_without_name_field() {
        let without = build_prompt("Gnome", "Bard (College of Lore)", &FieldRequest::new(false, true, false, false), "");
        assert!(without.contains("Do not invent or include proper names"));
        assert!(without.contains("'this character', 'they'"));

        let with = build_prompt("Gnome", "Bard (College of Lore)", &FieldRequest::new(true, true, false, false), "");
        assert!(!with.contains("Do not invent"));
    }

    #[test]
    fn test_blank_theme_omits_clause() {
        let request = FieldRequest::new(false, false, true, true);
        let blank = build_prompt("Orc", "Barbarian (Path of the Berserker)", &request, "   \n ");
        let none = build_prompt("Orc", "Barbarian (Path of the Berserker)", &request, "");

        assert_eq!(blank, none);
        assert!(!blank.contains("theme"));
        assert!(blank.contains("a(n) Orc Barbarian (Path of the Berserker). Write a tight"));
    }

    #[test]
    fn test_request_order_is_fixed() {
        let request: FieldRequest = [Field::Playstyle, Field::Name, Field::Personality]
            .into_iter()
            .collect();
        let order: Vec<Field> = request.iter().collect();
        assert_eq!(order, vec![Field::Name, Field::Personality, Field::Playstyle]);
        assert_eq!(FieldRequest::all().iter().count(), 4);
    }
}
