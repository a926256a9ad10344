//! The relevance scorer's request/response shapes, narrowed to a single
//! keep/drop question instead of a general chat API.

/// Token budget caps, enforced by truncating the prompt before it is
/// sent — never by asking the model to be brief.
pub const MAX_INPUT_CHARS: usize = 1200; // ~300 tokens at ~4 chars/token
pub const MAX_OUTPUT_TOKENS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Keep,
    Drop,
}

#[derive(Debug, Clone)]
pub struct RelevanceInput {
    pub title: String,
    pub teaser: String,
    pub matched_keyword: String,
    pub brand_name: String,
}

impl RelevanceInput {
    /// Render the scoring prompt, truncating the teaser first since it is
    /// the largest and least information-dense field.
    pub fn render_prompt(&self) -> String {
        let fixed_len = self.title.len() + self.matched_keyword.len() + self.brand_name.len() + 64;
        let teaser_budget = MAX_INPUT_CHARS.saturating_sub(fixed_len);
        let teaser: String = self.teaser.chars().take(teaser_budget).collect();

        format!(
            "Brand: {}\nKeyword: {}\nTitle: {}\nTeaser: {}\nIs this article relevant to the brand and keyword? Answer keep or drop.",
            self.brand_name, self.matched_keyword, self.title, teaser
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_prompt_truncates_long_teasers() {
        let input = RelevanceInput {
            title: "Short title".into(),
            teaser: "x".repeat(5000),
            matched_keyword: "netto".into(),
            brand_name: "Netto".into(),
        };
        assert!(input.render_prompt().len() <= MAX_INPUT_CHARS + 200);
    }
}
