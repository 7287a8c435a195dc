//! Triage prompt construction.
//!
//! The instruction embeds the full specialization name list and the output
//! grammar the parser expects. Keep the grammar line in sync with
//! [`crate::parse`].

use medgid_directory::registry;

/// Symptom → specialist hints embedded in the instruction. They steer the
/// model toward registry names; the parser still filters its output.
const HINTS: &str = "\
- Headache, dizziness, memory problems -> Neurologist
- Chest pain, blood pressure, arrhythmia -> Cardiologist
- Cough, shortness of breath, breathing problems -> Pulmonologist
- Stomach pain, nausea, digestive problems -> Therapist
- Skin problems, rash, itching -> Dermatologist
- Joint or muscle pain, injuries -> Traumatologist or Orthopedist
- Vision problems -> Ophthalmologist
- Women's health concerns -> Gynecologist
- Men's health concerns -> Urologist
- Hormonal disorders -> Endocrinologist
- General symptoms (fever, weakness) -> Therapist";

/// Builds the instruction for one symptom description.
pub fn build_prompt(symptoms: &str) -> String {
    let names: Vec<&str> = registry::all().iter().map(|s| s.display_name).collect();
    format!(
        "You are an experienced medical consultant. Analyze the symptoms and \
suggest the most suitable specialists from this list:\n{names}\n\n\
POSSIBLE SPECIALISTS TO RECOMMEND:\n{hints}\n\n\
The answer format MUST BE EXACTLY:\n\
Diagnosis: <short description of the possible condition>. Specialists: <Specialist1>, <Specialist2>\n\n\
Symptoms: {symptoms}",
        names = names.join(", "),
        hints = HINTS,
        symptoms = symptoms,
    )
}
