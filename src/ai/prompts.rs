pub const ANALYSIS_SYSTEM: &str = "You are an expert tutor who diagnoses gaps in a learner's understanding. \
Read the learner's material and list the distinct topics it covers. For each topic estimate how confidently \
the learner understands it, from 0.0 (not at all) to 1.0 (fully). Reply with JSON only.";

pub const FLASHCARD_SYSTEM: &str = "You are an expert tutor who writes concise study flashcards. \
Each card has one clear question and a short, accurate answer. Reply with JSON only.";

pub fn analysis_prompt(content: &str) -> String {
    format!(
        "Analyze the following learning material and identify knowledge blind spots.\n\n\
         Respond with exactly this JSON shape:\n\
         {{\"topics\": [{{\"topic\": \"<topic name>\", \"confidence\": <number between 0 and 1>, \
         \"explanation\": \"<one sentence on what is missing or solid>\"}}]}}\n\n\
         Material:\n\"\"\"\n{}\n\"\"\"",
        content
    )
}

pub fn flashcard_prompt(content: &str, topic: Option<&str>, count: u32) -> String {
    let focus = match topic {
        Some(topic) => format!(" Focus on the topic \"{}\".", topic),
        None => String::new(),
    };
    format!(
        "Create {} flashcards from the following learning material.{}\n\n\
         Respond with exactly this JSON shape:\n\
         {{\"flashcards\": [{{\"question\": \"<question>\", \"answer\": \"<answer>\", \"topic\": \"<topic>\"}}]}}\n\n\
         Material:\n\"\"\"\n{}\n\"\"\"",
        count, focus, content
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flashcard_prompt_mentions_count_and_topic() {
        let prompt = flashcard_prompt("Cells divide by mitosis.", Some("Biology"), 5);
        assert!(prompt.starts_with("Create 5 flashcards"));
        assert!(prompt.contains("Focus on the topic \"Biology\"."));
        assert!(prompt.contains("Cells divide by mitosis."));
    }

    #[test]
    fn test_analysis_prompt_embeds_material() {
        let prompt = analysis_prompt("Photosynthesis converts light.");
        assert!(prompt.contains("\"topics\""));
        assert!(prompt.contains("Photosynthesis converts light."));
    }
}
