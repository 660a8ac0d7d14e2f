use super::record::JustificationRecord;

const NO_CONCERNS: &str = "None stated";

/// Renders the generation prompt for one record. Field values are trimmed
/// and inserted as-is.
pub fn render(record: &JustificationRecord) -> String {
    let concerns = match record.concerns.trim() {
        "" => NO_CONCERNS,
        c => c,
    };
    let concerns_instruction = if concerns == NO_CONCERNS {
        String::new()
    } else {
        format!(
            "\n5. Explicitly acknowledge and address each stated concern by name: {concerns}"
        )
    };

    format!(
        "You are a senior CMC regulatory writer with expertise in ICH, FDA, and EMA guidelines.

Your task is to generate a high-quality, regulatory-compliant justification for the use of this excipient in a drug product formulation.

Input:
- Drug name: {drug}
- Excipient: {excipient}
- Formulation type: {formulation}
- Role of excipient: {role}
- Concerns or questions to address: {concerns}

Output:
1. A scientifically sound justification (100-150 words)
2. Include references to ICH Q8/Q9/Q10 where appropriate
3. Do not invent literature citations; supporting PubMed references are attached separately
4. Tone: formal, precise, submission-ready{concerns_instruction}
",
        drug = record.drug_name.trim(),
        excipient = record.excipient.trim(),
        formulation = record.formulation_type.trim(),
        role = record.excipient_role.trim(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn includes_every_field_and_guidelines() {
        let record =
            JustificationRecord::new("Metformin", " CMC ", "IR tablet", "Disintegrant", "");
        let prompt = render(&record);

        assert!(prompt.contains("- Drug name: Metformin\n"));
        assert!(prompt.contains("- Excipient: CMC\n"));
        assert!(prompt.contains("- Formulation type: IR tablet\n"));
        assert!(prompt.contains("- Role of excipient: Disintegrant\n"));
        assert!(prompt.contains("100-150 words"));
        assert!(prompt.contains("ICH Q8/Q9/Q10"));
    }

    #[test]
    fn empty_concerns_render_placeholder_without_instruction() {
        let record = JustificationRecord::new("A", "B", "C", "D", "  ");
        let prompt = render(&record);
        assert!(prompt.contains("Concerns or questions to address: None stated"));
        assert!(!prompt.contains("acknowledge and address"));
    }

    #[test]
    fn stated_concerns_are_named_in_instructions() {
        let record = JustificationRecord::new("A", "B", "C", "D", "nitrosamine risk");
        let prompt = render(&record);
        assert!(prompt.contains("Concerns or questions to address: nitrosamine risk"));
        assert!(prompt.contains("by name: nitrosamine risk"));
    }
}
