//! Markdown code-fence extraction.
//!
//! Models are told to return bare code but often wrap it in a fenced block
//! anyway. [`extract_fenced_block`] recovers the inner text.

/// Language tags accepted around generated component code, most specific first.
pub const COMPONENT_FENCE_TAGS: &[&str] = &["tsx", "typescript"];

/// Language tags accepted around itinerary JSON.
pub const ITINERARY_FENCE_TAGS: &[&str] = &["json"];

const FENCE: &str = "```";

/// Return the body of the first fenced block tagged with one of `tags`.
///
/// Tags are tried in order; the first tag whose opening marker occurs in the
/// text wins, even if a block with a later tag appears earlier in the text.
/// The body runs from the end of that marker to the next closing fence, or
/// to the end of the text when the block is never closed. Without any
/// matching marker the trimmed text is returned unchanged.
pub fn extract_fenced_block(text: &str, tags: &[&str]) -> String {
    let trimmed = text.trim();

    for tag in tags {
        let marker = format!("{FENCE}{tag}");
        if let Some(start) = trimmed.find(&marker) {
            let rest = &trimmed[start + marker.len()..];
            let body = match rest.find(FENCE) {
                Some(end) => &rest[..end],
                None => rest,
            };
            return body.trim().to_string();
        }
    }

    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tsx_fence() {
        let text = "```tsx\nexport const A = () => null;\n```";
        assert_eq!(
            extract_fenced_block(text, COMPONENT_FENCE_TAGS),
            "export const A = () => null;"
        );
    }

    #[test]
    fn strips_typescript_fence_with_surrounding_prose() {
        let text = "Here you go:\n```typescript\nconst x = 1;\n```\nEnjoy!";
        assert_eq!(extract_fenced_block(text, COMPONENT_FENCE_TAGS), "const x = 1;");
    }

    #[test]
    fn unfenced_text_is_only_trimmed() {
        let text = "\n  export function B() {}\n\n";
        assert_eq!(
            extract_fenced_block(text, COMPONENT_FENCE_TAGS),
            "export function B() {}"
        );
    }

    #[test]
    fn tsx_wins_over_earlier_typescript_block() {
        let text = "```typescript\nfirst\n```\n```tsx\nsecond\n```";
        assert_eq!(extract_fenced_block(text, COMPONENT_FENCE_TAGS), "second");
    }

    #[test]
    fn first_block_of_a_tag_is_taken() {
        let text = "```tsx\none\n```\n```tsx\ntwo\n```";
        assert_eq!(extract_fenced_block(text, COMPONENT_FENCE_TAGS), "one");
    }

    #[test]
    fn unclosed_fence_runs_to_end_of_text() {
        let text = "```tsx\nexport const C = 1;";
        assert_eq!(
            extract_fenced_block(text, COMPONENT_FENCE_TAGS),
            "export const C = 1;"
        );
    }

    #[test]
    fn untagged_fence_is_left_alone() {
        let text = "```\nplain\n```";
        assert_eq!(extract_fenced_block(text, COMPONENT_FENCE_TAGS), text);
    }

    #[test]
    fn json_fence() {
        let text = "```json\n{\"a\": 1}\n```";
        assert_eq!(extract_fenced_block(text, ITINERARY_FENCE_TAGS), "{\"a\": 1}");
    }
}
