/// Fixed user-facing strings. Anything that has to be recognisable by
/// exact value (fallback text, the class sentinel) lives here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    NoResponseName,
    NoCharacterGenerated,
    TryAgain,
    NoValidClass,
    NotGenerated,
    ExtractionFailed,
    InvalidCount,
    NothingToSave,
    MissingApiKey,
}

impl Notice {
    pub fn as_str(self) -> &'static str {
        match self {
            Notice::NoResponseName => "Error: No response from AI.",
            Notice::NoCharacterGenerated => "No character generated.",
            Notice::TryAgain => "Please try again.",
            Notice::NoValidClass => "No valid class found",
            Notice::NotGenerated => "(not generated)",
            Notice::ExtractionFailed => "Unable to extract data properly",
            Notice::InvalidCount => "Please enter a whole number between 1 and 5.",
            Notice::NothingToSave => "Please generate Characters first.",
            Notice::MissingApiKey => {
                "API key not found.\n\
                 Set the variable using one of the following commands:\n\
                 Windows (PowerShell) - $env:{VAR}='put-key-here'\n\
                 Mac/Linux (Bash) - export {VAR}='put-key-here'"
            }
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Missing-key text with the variable name filled in.
pub fn missing_api_key(var: &str) -> String {
    Notice::MissingApiKey.as_str().replace("{VAR}", var)
}
