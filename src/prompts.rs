//! Prompt text for the two model calls.

pub const TOPIC_SYSTEM: &str = "You are an editor who proposes concise, engaging blog post titles.";
pub const ARTICLE_SYSTEM: &str = "You are a professional blog writer.";

pub struct TopicPrompt<'a> {
    pub subject: &'a str,
    pub excluded: &'a [String],
    pub recent: &'a [String],
}

impl TopicPrompt<'_> {
    pub fn render(&self) -> String {
        let mut out = format!(
            "Suggest one fresh, specific blog post topic about {subject}. Reply with the topic title only, on a single line.",
            subject = self.subject,
        );
        if !self.excluded.is_empty() {
            out.push_str(&format!(" Do not cover any of these subjects: {}.", self.excluded.join(", ")));
        }
        if !self.recent.is_empty() {
            out.push_str(&format!(" These topics were used recently and must not be repeated: {}.", self.recent.join("; ")));
        }
        out
    }
}

pub struct ArticlePrompt<'a> {
    pub topic: &'a str,
    pub style: &'a str,
    pub words: u32,
    pub year: i32,
    pub contact_block: &'a str,
}

impl ArticlePrompt<'_> {
    pub fn render(&self) -> String {
        format!(
            "Write a {words}-word blog post about {topic} with SEO optimization. {style} \
             Keep every fact, statistic and trend current as of {year}; do not present older information as new. \
             Finish with a closing section titled \"Work With Us\" that includes the following text exactly as written:\n\n{contact}",
            words = self.words,
            topic = self.topic,
            style = self.style,
            year = self.year,
            contact = self.contact_block,
        )
    }
}
