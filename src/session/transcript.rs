use super::QaEntry;

pub const TRANSCRIPT_FILE_NAME: &str = "qa_session.txt";

/// `Q{n}: ...\nA{n}: ...` blocks, numbered from 1, separated by a blank line.
pub fn format_transcript(entries: &[QaEntry]) -> String {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            format!(
                "Q{n}: {}\nA{n}: {}",
                entry.question,
                entry.answer,
                n = i + 1
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
