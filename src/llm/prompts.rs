// src/llm/prompts.rs

pub fn summary_prompt(topic: &str, schedule_title: &str) -> String {
    format!(
        r#"You are a patient teaching assistant.
Explain the topic "{topic}", which is part of the subject "{schedule_title}", in a short and simple way for a complete beginner.
Then give one real-life example that makes it easier to understand.
Answer with exactly two short paragraphs: the explanation first, then the example, separated by a line break."#
    )
}

pub fn detail_prompt(topic: &str) -> String {
    format!(
        r#"You are an expert tutor.
Explain the topic "{topic}" in detail as bullet points, the way you would explain it to a five year old.
Use only 5 or 6 key points.
Format:
- Point 1
- Point 2
..."#
    )
}

pub fn quiz_prompt(topic: &str, questions: usize) -> String {
    format!(
        r#"Write {questions} True/False quiz questions with answers on the topic "{topic}".
Answer only with True or False, without any explanation.
Use exactly this format, one item per line:
Q1: ...
A1: ...
Q2: ...
A2: ...
..."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_embed_inputs() {
        let summary = summary_prompt("Quadratics", "Algebra");
        assert!(summary.contains("\"Quadratics\""));
        assert!(summary.contains("\"Algebra\""));

        assert!(detail_prompt("Fractions").contains("\"Fractions\""));

        let quiz = quiz_prompt("Fractions", 5);
        assert!(quiz.starts_with("Write 5 True/False"));
        assert!(quiz.contains("Q1: ...\nA1: ..."));
    }
}
