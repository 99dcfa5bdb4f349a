use crate::prompt::{Field, FieldRequest};
use anyhow::Result;
use inquire::{Confirm, MultiSelect, Text};

/// Raw answers from one pass through the form. The count stays unparsed so
/// the generator can reject it with its own message.
#[derive(Debug, Clone)]
pub struct FormInput {
    pub count: String,
    pub theme: Option<String>,
    pub fields: FieldRequest,
}

pub fn ask_batch() -> Result<FormInput> {
    let count = Text::new("Number of Characters to Generate (1-5):")
        .with_default("1")
        .prompt()?;

    let use_theme = Confirm::new("Use Custom Theme?")
        .with_default(false)
        .prompt()?;
    let theme = if use_theme {
        Some(Text::new("Theme Description:").prompt()?)
    } else {
        None
    };

    let fields = MultiSelect::new("Generate with AI:", Field::ALL.to_vec())
        .with_help_message("Leave everything unselected for race and class only")
        .prompt()?;

    Ok(FormInput {
        count,
        theme,
        fields: fields.into_iter().collect(),
    })
}

pub fn ask_save() -> Result<bool> {
    Ok(Confirm::new("Save to JSON File?").with_default(false).prompt()?)
}

pub fn ask_again() -> Result<bool> {
    Ok(Confirm::new("Generate another batch?").with_default(true).prompt()?)
}
