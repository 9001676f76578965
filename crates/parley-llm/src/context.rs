//! Folding attachment text into the prompt

use std::fmt::Write as _;

use parley_files::Attachment;

const LEADING_INSTRUCTION: &str = "The user has attached the following files. Answer using their contents \
                                   where relevant and cite the file names you draw on.";

const TRAILING_INSTRUCTION: &str = "When your answer relies on the attached files, say which file each point comes from.";

/// Render the context block for a set of attachments
///
/// Only attachments with extracted text and no parse error take part. When
/// none qualify the result is empty and no block should be injected. Output
/// depends on nothing but the input, so repeated calls are byte-identical.
pub fn build_context(attachments: &[Attachment]) -> String {
    let mut usable = attachments.iter().filter(|a| a.is_usable()).peekable();

    if usable.peek().is_none() {
        return String::new();
    }

    let mut block = String::from(LEADING_INSTRUCTION);
    block.push_str("\n\n");

    for attachment in usable {
        let text = attachment.text_content.as_deref().unwrap_or_default();

        let _ = writeln!(
            block,
            r#"<file name="{}" type="{}">"#,
            escape_attribute(&attachment.name),
            escape_attribute(&attachment.media_type)
        );

        if attachment.truncated {
            let _ = writeln!(block, "[Content truncated to {} characters]", text.chars().count());
        }

        block.push_str(text);
        block.push_str("\n</file>\n\n");
    }

    block.push_str(TRAILING_INSTRUCTION);
    block
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }

    escaped
}
