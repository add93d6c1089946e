//! Indexer definitions and implementations
//!
//! Each route identifier has a static descriptor here: what the backend is
//! called and what it advertises in its capability document.
//!
//! # Adding a new indexer
//!
//! 1. Add a variant to `IndexerId`
//! 2. Add its descriptor to the `AVAILABLE_INDEXERS` list
//! 3. Register an implementation in the `IndexerRegistry`

pub mod newznab;

use once_cell::sync::Lazy;

use super::categories::{self, cats};
use super::{IndexerId, MovieSearchParam, TorznabCapabilities, TvSearchParam};

/// Information about an available indexer type
#[derive(Debug, Clone)]
pub struct IndexerTypeInfo {
    pub id: IndexerId,
    /// Display name
    pub name: &'static str,
    pub description: &'static str,
    /// Primary site URL
    pub site_link: &'static str,
    /// Categories advertised in the capability document
    pub categories: &'static [i32],
}

impl IndexerTypeInfo {
    /// Capability document advertised for this backend
    pub fn capabilities(&self) -> TorznabCapabilities {
        TorznabCapabilities {
            tv_search_params: vec![TvSearchParam::Q, TvSearchParam::Season, TvSearchParam::Ep],
            movie_search_params: vec![MovieSearchParam::Q],
            categories: categories::resolve(self.categories),
            ..TorznabCapabilities::new()
        }
    }
}

/// List of all available indexer types
pub static AVAILABLE_INDEXERS: Lazy<Vec<IndexerTypeInfo>> = Lazy::new(|| {
    vec![
        IndexerTypeInfo {
            id: IndexerId::Amule,
            name: "aMule",
            description: "eD2k and Kad network search through aMule",
            site_link: "https://www.amule.org/",
            categories: &[
                cats::MOVIES,
                cats::TV,
                cats::AUDIO,
                cats::BOOKS,
                cats::PC,
                cats::OTHER,
            ],
        },
        IndexerTypeInfo {
            id: IndexerId::Ddunlimitednet,
            name: "DDUnlimited",
            description: "DDUnlimited.net community release board",
            site_link: "https://ddunlimited.net/",
            categories: &[
                cats::MOVIES,
                cats::MOVIES_SD,
                cats::MOVIES_HD,
                cats::MOVIES_UHD,
                cats::MOVIES_BLURAY,
                cats::MOVIES_DVD,
                cats::TV,
                cats::TV_SD,
                cats::TV_HD,
                cats::TV_UHD,
                cats::TV_ANIME,
                cats::TV_DOCUMENTARY,
                cats::AUDIO,
                cats::AUDIO_MP3,
                cats::AUDIO_LOSSLESS,
                cats::BOOKS,
                cats::BOOKS_EBOOK,
                cats::BOOKS_COMICS,
            ],
        },
    ]
});

/// Get information about a specific indexer type
pub fn get_indexer_info(id: IndexerId) -> Option<&'static IndexerTypeInfo> {
    AVAILABLE_INDEXERS.iter().find(|i| i.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_id_has_a_descriptor() {
        for id in IndexerId::ALL {
            assert!(get_indexer_info(id).is_some(), "missing descriptor for {id}");
        }
        assert_eq!(AVAILABLE_INDEXERS.len(), IndexerId::ALL.len());
    }

    #[test]
    fn test_capabilities_advertise_both_search_modes() {
        let info = get_indexer_info(IndexerId::Ddunlimitednet).unwrap();
        let caps = info.capabilities();

        assert!(caps.search_available);
        assert!(caps.tv_search_available());
        assert!(caps.movie_search_available());
        assert_eq!(caps.limits_default, Some(100));
        assert_eq!(caps.categories.len(), info.categories.len());
    }
}
