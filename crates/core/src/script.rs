use crate::{
    error::{ClipError, Result},
    provider::ChatModel,
};

const SCRIPT_SYSTEM_PROMPT: &str = r#"You are a writer for short, fact-driven videos.

Write the narration for a video of 40 to 60 seconds (about 140 words) on the topic
you are given. Open with a hook, follow with surprising but true facts, and end on a
memorable line.

Output ONLY the narration text: no title, no stage directions, no markdown, no quotes
around the text."#;

/// Generate the narration script for a topic
pub async fn generate_script<C: ChatModel>(chat: &C, topic: &str) -> Result<String> {
    let script = chat
        .complete(SCRIPT_SYSTEM_PROMPT, &format!("Topic: {}", topic.trim()))
        .await?;
    let script = script.trim().trim_matches('"').trim().to_string();

    if script.is_empty() {
        return Err(ClipError::ChatFailed {
            reason: format!("empty script returned for topic '{}'", topic.trim()),
        });
    }
    Ok(script)
}
