//! Use case record - the unit of extraction

use std::fmt;

/// The eight fields of a use case, in schema order.
///
/// The prompt, the response parser and the renderer all walk fields through
/// [`UseCaseField::ALL`], so the order here is the order everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UseCaseField {
    /// Name of the use case
    Title,
    /// Who takes part
    Actors,
    /// What must hold before the use case starts
    Preconditions,
    /// What starts the use case
    Trigger,
    /// Ordered steps of the main success path
    MainFlow,
    /// Deviations from the main flow
    AlternativeFlows,
    /// What holds once the use case ends
    Postconditions,
    /// Free-form remarks
    Notes,
}

impl UseCaseField {
    /// All fields in schema order
    pub const ALL: [UseCaseField; 8] = [
        UseCaseField::Title,
        UseCaseField::Actors,
        UseCaseField::Preconditions,
        UseCaseField::Trigger,
        UseCaseField::MainFlow,
        UseCaseField::AlternativeFlows,
        UseCaseField::Postconditions,
        UseCaseField::Notes,
    ];

    /// Label used in prompts and expected in model output
    pub fn label(&self) -> &'static str {
        match self {
            UseCaseField::Title => "Use Case Title",
            UseCaseField::Actors => "Actor(s)",
            UseCaseField::Preconditions => "Preconditions",
            UseCaseField::Trigger => "Trigger",
            UseCaseField::MainFlow => "Main Flow",
            UseCaseField::AlternativeFlows => "Alternative Flows",
            UseCaseField::Postconditions => "Postconditions",
            UseCaseField::Notes => "Notes",
        }
    }

    /// Whether the field holds an ordered sequence rather than a single string
    pub fn is_sequence(&self) -> bool {
        matches!(
            self,
            UseCaseField::Actors | UseCaseField::MainFlow | UseCaseField::AlternativeFlows
        )
    }
}

impl fmt::Display for UseCaseField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Value of one field, borrowed from a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// Single string field
    Text(&'a str),
    /// Sequence field
    List(&'a [String]),
}

impl FieldValue<'_> {
    /// True when the field carries no information
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.is_empty(),
            FieldValue::List(items) => items.is_empty(),
        }
    }
}

/// A structured use case extracted from a document.
///
/// Absent information is an empty string or empty sequence, never missing.
/// Records are built once by the response parser and not modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UseCaseRecord {
    /// Use case name (never empty in parser output)
    pub title: String,

    /// Participating actors
    pub actors: Vec<String>,

    /// Conditions required before the use case begins
    pub preconditions: String,

    /// Event that starts the use case
    pub trigger: String,

    /// Main flow steps in order
    pub main_flow: Vec<String>,

    /// Alternative flows in order
    pub alternative_flows: Vec<String>,

    /// Conditions that hold afterwards
    pub postconditions: String,

    /// Additional remarks
    pub notes: String,
}

impl UseCaseRecord {
    /// Create a record with only a title set
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Borrow the value of a field
    pub fn field(&self, field: UseCaseField) -> FieldValue<'_> {
        match field {
            UseCaseField::Title => FieldValue::Text(&self.title),
            UseCaseField::Actors => FieldValue::List(&self.actors),
            UseCaseField::Preconditions => FieldValue::Text(&self.preconditions),
            UseCaseField::Trigger => FieldValue::Text(&self.trigger),
            UseCaseField::MainFlow => FieldValue::List(&self.main_flow),
            UseCaseField::AlternativeFlows => FieldValue::List(&self.alternative_flows),
            UseCaseField::Postconditions => FieldValue::Text(&self.postconditions),
            UseCaseField::Notes => FieldValue::Text(&self.notes),
        }
    }

    /// Iterate over all fields in schema order
    pub fn fields(&self) -> impl Iterator<Item = (UseCaseField, FieldValue<'_>)> + '_ {
        UseCaseField::ALL.iter().map(move |f| (*f, self.field(*f)))
    }

    /// A record is valid when its title has visible content
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty()
    }
}
