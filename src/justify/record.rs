use serde::Deserialize;

/// Common dosage forms. Other values are accepted and logged at debug level.
pub const KNOWN_FORMULATIONS: &[&str] = &[
    "IR tablet",
    "Oral solution",
    "Parenteral injection",
    "SR capsule",
];

/// Common excipient roles. Other values are accepted and logged at debug level.
pub const KNOWN_ROLES: &[&str] = &[
    "Diluent",
    "Binder",
    "Disintegrant",
    "Lubricant",
    "Co-solvent",
    "Stabilizer",
];

/// One excipient to justify. Column names match the batch CSV header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct JustificationRecord {
    #[serde(rename = "Drug Name", default)]
    pub drug_name: String,
    #[serde(rename = "Excipient", default)]
    pub excipient: String,
    #[serde(rename = "Formulation Type", default)]
    pub formulation_type: String,
    #[serde(rename = "Excipient Role", default)]
    pub excipient_role: String,
    #[serde(rename = "Concerns", default)]
    pub concerns: String,
}

impl JustificationRecord {
    pub fn new(
        drug_name: impl Into<String>,
        excipient: impl Into<String>,
        formulation_type: impl Into<String>,
        excipient_role: impl Into<String>,
        concerns: impl Into<String>,
    ) -> Self {
        Self {
            drug_name: drug_name.into(),
            excipient: excipient.into(),
            formulation_type: formulation_type.into(),
            excipient_role: excipient_role.into(),
            concerns: concerns.into(),
        }
    }

    /// Human-readable names of required fields that are blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("drug name", &self.drug_name),
            ("excipient", &self.excipient),
            ("formulation type", &self.formulation_type),
            ("excipient role", &self.excipient_role),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Literature search terms: excipient, role and dosage form.
    pub fn citation_query(&self) -> String {
        [&self.excipient, &self.excipient_role, &self.formulation_type]
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn has_known_formulation(&self) -> bool {
        is_known(KNOWN_FORMULATIONS, &self.formulation_type)
    }

    pub fn has_known_role(&self) -> bool {
        is_known(KNOWN_ROLES, &self.excipient_role)
    }
}

fn is_known(options: &[&str], value: &str) -> bool {
    let value = value.trim();
    options.iter().any(|o| o.eq_ignore_ascii_case(value))
}
