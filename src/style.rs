use rand::{seq::IndexedRandom, Rng};

pub const STYLE_DIRECTIVES: &[&str] = &[
    "Write in a friendly, conversational tone with practical tips the reader can act on.",
    "Write in an authoritative, expert tone backed by concrete examples and industry insight.",
    "Structure the post as a numbered list of key points, each with a short explanation.",
    "Open with a short real-world story, then expand it into actionable advice.",
    "Write as a step-by-step guide with clear headings for each stage.",
];

pub fn pick_style<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    STYLE_DIRECTIVES.choose(rng).copied().unwrap_or(STYLE_DIRECTIVES[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    #[test]
    fn always_one_of_the_directives() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = HashSet::new();
        for _ in 0..200 {
            let s = pick_style(&mut rng);
            assert!(STYLE_DIRECTIVES.contains(&s));
            seen.insert(s);
        }
        assert_eq!(seen.len(), STYLE_DIRECTIVES.len());
    }
}
