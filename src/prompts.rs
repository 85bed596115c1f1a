//! Prompts for the vision-LLM OCR backend.
//!
//! The OCR backend only needs to turn the top band of a scanned checklist
//! page into plain text; the header detector does the rest. Keeping the
//! prompt here lets tests assert on it without a live model.

/// System prompt sent with every OCR request.
pub const OCR_SYSTEM_PROMPT: &str = r#"You are a precise OCR engine. You receive the top part of a scanned page from an inspection checklist report.

Rules:
1. Transcribe ALL visible text exactly as printed, in reading order.
2. Keep each printed line on its own line. Keep field labels such as "Name:", "ID:", "Location:" and "Equipment Name:" with their values.
3. Keep codes such as "T12.BESS.04:" exactly, including dots and colons.
4. Do NOT add commentary, Markdown, or explanations.
5. If the image contains no readable text, reply with an empty message."#;

/// Trim a model reply and drop it when it carries no text.
pub fn normalise_ocr_reply(reply: &str) -> Option<String> {
    let trimmed = reply
        .trim()
        .trim_start_matches("```text")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.replace("\r\n", "\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_mentions_labels_the_detector_needs() {
        for label in ["Name:", "Location:", "Equipment Name:"] {
            assert!(OCR_SYSTEM_PROMPT.contains(label), "missing {label}");
        }
    }

    #[test]
    fn empty_reply_is_none() {
        assert_eq!(normalise_ocr_reply("  \n "), None);
        assert_eq!(normalise_ocr_reply("```\n```"), None);
    }

    #[test]
    fn fenced_reply_is_unwrapped() {
        assert_eq!(
            normalise_ocr_reply("```text\nT1.BESS.2: Rack\r\nName: X\n```"),
            Some("T1.BESS.2: Rack\nName: X".to_string())
        );
    }
}
