//! Torznab category definitions
//!
//! Standard Torznab categories follow the Newznab numbering scheme.
//! Main categories are in thousands (1000, 2000, etc.) and subcategories
//! add tens (2010, 2020, etc.).

/// A Torznab category definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TorznabCategory {
    pub id: i32,
    pub name: &'static str,
    pub parent_id: Option<i32>,
}

impl TorznabCategory {
    pub const fn new(id: i32, name: &'static str, parent_id: Option<i32>) -> Self {
        Self {
            id,
            name,
            parent_id,
        }
    }

    /// Check if this is a parent category
    pub fn is_parent(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Standard Torznab categories, numbered as in Newznab
pub static TORZNAB_CATEGORIES: &[TorznabCategory] = &[
    // Console (1000)
    TorznabCategory::new(1000, "Console", None),
    TorznabCategory::new(1010, "Console/NDS", Some(1000)),
    TorznabCategory::new(1020, "Console/PSP", Some(1000)),
    TorznabCategory::new(1030, "Console/Wii", Some(1000)),
    TorznabCategory::new(1040, "Console/Xbox", Some(1000)),
    TorznabCategory::new(1050, "Console/Xbox 360", Some(1000)),
    TorznabCategory::new(1060, "Console/WiiWare", Some(1000)),
    TorznabCategory::new(1070, "Console/Xbox 360 DLC", Some(1000)),
    TorznabCategory::new(1080, "Console/PS3", Some(1000)),
    TorznabCategory::new(1090, "Console/Other", Some(1000)),
    TorznabCategory::new(1110, "Console/3DS", Some(1000)),
    TorznabCategory::new(1120, "Console/PS Vita", Some(1000)),
    TorznabCategory::new(1130, "Console/WiiU", Some(1000)),
    TorznabCategory::new(1140, "Console/Xbox One", Some(1000)),
    TorznabCategory::new(1150, "Console/PS4", Some(1000)),
    TorznabCategory::new(1180, "Console/Switch", Some(1000)),
    // Movies (2000)
    TorznabCategory::new(2000, "Movies", None),
    TorznabCategory::new(2010, "Movies/Foreign", Some(2000)),
    TorznabCategory::new(2020, "Movies/Other", Some(2000)),
    TorznabCategory::new(2030, "Movies/SD", Some(2000)),
    TorznabCategory::new(2040, "Movies/HD", Some(2000)),
    TorznabCategory::new(2045, "Movies/UHD", Some(2000)),
    TorznabCategory::new(2050, "Movies/BluRay", Some(2000)),
    TorznabCategory::new(2060, "Movies/3D", Some(2000)),
    TorznabCategory::new(2070, "Movies/DVD", Some(2000)),
    TorznabCategory::new(2080, "Movies/WEB-DL", Some(2000)),
    // Audio (3000)
    TorznabCategory::new(3000, "Audio", None),
    TorznabCategory::new(3010, "Audio/MP3", Some(3000)),
    TorznabCategory::new(3020, "Audio/Video", Some(3000)),
    TorznabCategory::new(3030, "Audio/Audiobook", Some(3000)),
    TorznabCategory::new(3040, "Audio/Lossless", Some(3000)),
    TorznabCategory::new(3050, "Audio/Other", Some(3000)),
    TorznabCategory::new(3060, "Audio/Foreign", Some(3000)),
    // PC (4000)
    TorznabCategory::new(4000, "PC", None),
    TorznabCategory::new(4010, "PC/0day", Some(4000)),
    TorznabCategory::new(4020, "PC/ISO", Some(4000)),
    TorznabCategory::new(4030, "PC/Mac", Some(4000)),
    TorznabCategory::new(4040, "PC/Mobile-Other", Some(4000)),
    TorznabCategory::new(4050, "PC/Games", Some(4000)),
    TorznabCategory::new(4060, "PC/Mobile-iOS", Some(4000)),
    TorznabCategory::new(4070, "PC/Mobile-Android", Some(4000)),
    // TV (5000)
    TorznabCategory::new(5000, "TV", None),
    TorznabCategory::new(5010, "TV/WEB-DL", Some(5000)),
    TorznabCategory::new(5020, "TV/Foreign", Some(5000)),
    TorznabCategory::new(5030, "TV/SD", Some(5000)),
    TorznabCategory::new(5040, "TV/HD", Some(5000)),
    TorznabCategory::new(5045, "TV/UHD", Some(5000)),
    TorznabCategory::new(5050, "TV/Other", Some(5000)),
    TorznabCategory::new(5060, "TV/Sport", Some(5000)),
    TorznabCategory::new(5070, "TV/Anime", Some(5000)),
    TorznabCategory::new(5080, "TV/Documentary", Some(5000)),
    // XXX (6000)
    TorznabCategory::new(6000, "XXX", None),
    TorznabCategory::new(6010, "XXX/DVD", Some(6000)),
    TorznabCategory::new(6020, "XXX/WMV", Some(6000)),
    TorznabCategory::new(6030, "XXX/XviD", Some(6000)),
    TorznabCategory::new(6040, "XXX/x264", Some(6000)),
    TorznabCategory::new(6050, "XXX/Pack", Some(6000)),
    TorznabCategory::new(6060, "XXX/ImageSet", Some(6000)),
    TorznabCategory::new(6070, "XXX/Other", Some(6000)),
    TorznabCategory::new(6080, "XXX/SD", Some(6000)),
    TorznabCategory::new(6090, "XXX/WEB-DL", Some(6000)),
    // Books (7000)
    TorznabCategory::new(7000, "Books", None),
    TorznabCategory::new(7010, "Books/Mags", Some(7000)),
    TorznabCategory::new(7020, "Books/EBook", Some(7000)),
    TorznabCategory::new(7030, "Books/Comics", Some(7000)),
    TorznabCategory::new(7040, "Books/Technical", Some(7000)),
    TorznabCategory::new(7050, "Books/Other", Some(7000)),
    TorznabCategory::new(7060, "Books/Foreign", Some(7000)),
    // Other (8000)
    TorznabCategory::new(8000, "Other", None),
    TorznabCategory::new(8010, "Other/Misc", Some(8000)),
    TorznabCategory::new(8020, "Other/Hashed", Some(8000)),
];

/// Common category constants for easy reference
pub mod cats {
    // Main categories
    pub const CONSOLE: i32 = 1000;
    pub const MOVIES: i32 = 2000;
    pub const AUDIO: i32 = 3000;
    pub const PC: i32 = 4000;
    pub const TV: i32 = 5000;
    pub const BOOKS: i32 = 7000;
    pub const OTHER: i32 = 8000;

    // Movies subcategories
    pub const MOVIES_FOREIGN: i32 = 2010;
    pub const MOVIES_SD: i32 = 2030;
    pub const MOVIES_HD: i32 = 2040;
    pub const MOVIES_UHD: i32 = 2045;
    pub const MOVIES_BLURAY: i32 = 2050;
    pub const MOVIES_DVD: i32 = 2070;

    // TV subcategories
    pub const TV_FOREIGN: i32 = 5020;
    pub const TV_SD: i32 = 5030;
    pub const TV_HD: i32 = 5040;
    pub const TV_UHD: i32 = 5045;
    pub const TV_ANIME: i32 = 5070;
    pub const TV_DOCUMENTARY: i32 = 5080;

    // Audio subcategories
    pub const AUDIO_MP3: i32 = 3010;
    pub const AUDIO_LOSSLESS: i32 = 3040;

    // Books subcategories
    pub const BOOKS_EBOOK: i32 = 7020;
    pub const BOOKS_COMICS: i32 = 7030;

    // PC subcategories
    pub const PC_GAMES: i32 = 4050;
}

/// Get a category by ID
pub fn get_category(id: i32) -> Option<&'static TorznabCategory> {
    TORZNAB_CATEGORIES.iter().find(|c| c.id == id)
}

/// Resolve a list of category IDs into definitions, skipping unknown IDs
pub fn resolve(ids: &[i32]) -> Vec<TorznabCategory> {
    ids.iter().filter_map(|&id| get_category(id)).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_category() {
        let tv_hd = get_category(cats::TV_HD).unwrap();
        assert_eq!(tv_hd.name, "TV/HD");
        assert_eq!(tv_hd.parent_id, Some(cats::TV));
        assert!(get_category(9999).is_none());
    }

    #[test]
    fn test_standard_table_is_complete() {
        let parents: Vec<i32> = TORZNAB_CATEGORIES
            .iter()
            .filter(|c| c.is_parent())
            .map(|c| c.id)
            .collect();
        assert_eq!(parents, vec![1000, 2000, 3000, 4000, 5000, 6000, 7000, 8000]);

        for id in [1060, 1180, 3060, 4070, 6090, 7060, 8020] {
            assert!(get_category(id).is_some(), "missing category {id}");
        }

        // Every subcategory sits under its thousand and points at a known parent
        for cat in TORZNAB_CATEGORIES.iter().filter(|c| !c.is_parent()) {
            assert_eq!(cat.parent_id, Some(cat.id / 1000 * 1000));
            assert!(get_category(cat.id / 1000 * 1000).is_some());
        }

        let mut ids: Vec<i32> = TORZNAB_CATEGORIES.iter().map(|c| c.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), TORZNAB_CATEGORIES.len());
    }

    #[test]
    fn test_resolve_skips_unknown() {
        let resolved = resolve(&[cats::MOVIES, 4242, cats::MOVIES_HD]);
        assert_eq!(resolved.len(), 2);
        assert!(resolved[0].is_parent());
        assert!(!resolved[1].is_parent());
    }
}
