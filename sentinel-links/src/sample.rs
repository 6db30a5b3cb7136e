//! Built-in sample links, shown until the first successful sync
//! or when stored state cannot be read.

use crate::{
    links::{Link, LinkId, Source},
    state::SyncState,
};

const SAMPLE_LINKS: &[(&str, &[(&str, &str)])] = &[
    (
        "AI & Machine Learning",
        &[
            (
                "Computational irreducibility - Wikipedia",
                "https://www.notion.so/11f4669440918141b5cff8f4aaebc7ae",
            ),
            (
                "Emergent Properties | Definition & Examples",
                "https://www.notion.so/11f4669440918145963ffde6b48160a8",
            ),
            (
                "AlphaEvolve",
                "https://www.notion.so/28146694409181e78206ff915def576f",
            ),
            (
                "Karpathy",
                "https://www.notion.so/2834669440918167a532e2a346ce5fc3",
            ),
        ],
    ),
    (
        "Robotics",
        &[
            (
                "Robots",
                "https://www.notion.so/193466944091814aa2c6e487bbcf8a09",
            ),
            (
                "Robot",
                "https://www.notion.so/15b46694409181d9844bfd42a07b836f",
            ),
            (
                "Humanoid Robotics",
                "https://www.notion.so/1c046694409181a88089ea34d239c10b",
            ),
        ],
    ),
    (
        "Economy & Post-Economy",
        &[
            (
                "Post economy",
                "https://www.notion.so/17e4669440918117af20d38da55dfca2",
            ),
            (
                "The big replacement",
                "https://www.notion.so/22e4669440918118abcff3d98440b0e6",
            ),
            (
                "Virtual economy Post economy",
                "https://www.notion.so/26f46694409181418960e6bcd45ba8df",
            ),
        ],
    ),
    (
        "Technology & Hardware",
        &[
            (
                "Pentium",
                "https://www.notion.so/17c46694409181c6adb0e4d6626a2066",
            ),
            (
                "ASML",
                "https://www.notion.so/14d46694409181aead51e40ffbb47118",
            ),
            (
                "GPU",
                "https://www.notion.so/12e46694409181b18471c4fe6723d10f",
            ),
        ],
    ),
];

/// Sample links, grouped in category order.
pub fn sample_links() -> Vec<Link> {
    SAMPLE_LINKS
        .iter()
        .flat_map(|(category, links)| {
            links.iter().map(move |(title, url)| Link {
                id: LinkId::derived(category, url, title),
                title: (*title).to_string(),
                url: (*url).to_string(),
                category: (*category).to_string(),
                notion_url: None,
                source: Source::Sample,
            })
        })
        .collect()
}

impl SyncState {
    /// State holding only the sample links, never synced.
    pub fn sample() -> Self {
        Self::new(sample_links(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_state() {
        let state = SyncState::sample();
        assert_eq!(state.len(), 13);
        assert_eq!(
            state.categories().names().collect::<Vec<_>>(),
            vec![
                "AI & Machine Learning",
                "Robotics",
                "Economy & Post-Economy",
                "Technology & Hardware"
            ]
        );
        assert!(state.last_sync().is_none());
        assert!(state.links().iter().all(|l| !l.is_deletable()));
        state.check_consistency().expect("consistent");
    }

    #[test]
    fn test_sample_ids_are_stable() {
        let first: Vec<LinkId> = sample_links().into_iter().map(|l| l.id).collect();
        let second: Vec<LinkId> = sample_links().into_iter().map(|l| l.id).collect();
        assert_eq!(first, second);
        let unique: std::collections::HashSet<&LinkId> = first.iter().collect();
        assert_eq!(unique.len(), first.len());
    }
}
