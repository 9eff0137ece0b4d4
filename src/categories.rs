//! Static category table mapping numeric category codes to display names.

use std::collections::BTreeMap;

use serde::Serialize;

const BUILTIN: &[(i64, &str)] = &[
    (1, "Film TV e programmi"),
    (2, "Musica"),
    (3, "E Books"),
    (4, "Film"),
    (6, "Linux"),
    (7, "Anime"),
    (8, "Cartoni"),
    (9, "Macintosh"),
    (10, "Windows Software"),
    (11, "Pc Game"),
    (12, "Playstation"),
    (13, "Students Releases"),
    (14, "Documentari"),
    (21, "Video Musicali"),
    (22, "Sport"),
    (23, "Teatro"),
    (24, "Wrestling"),
    (25, "Varie"),
    (26, "Xbox"),
    (27, "Immagini sfondi"),
    (28, "Altri Giochi"),
    (29, "Serie TV"),
    (30, "Fumetteria"),
    (31, "Trash"),
    (32, "Nintendo"),
    (34, "A Book"),
    (35, "Podcast"),
    (36, "Edicola"),
    (37, "Mobile"),
];

/// A single entry of the category table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub code: i64,
    pub name: &'static str,
}

/// Immutable code -> name table, built once and shared by reference.
#[derive(Debug, Clone)]
pub struct Categories {
    names: BTreeMap<i64, &'static str>,
}

impl Default for Categories {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Categories {
    /// The category table of the catalog dump.
    pub fn builtin() -> Self {
        Self {
            names: BUILTIN.iter().copied().collect(),
        }
    }

    /// Display name for a code. Unknown codes resolve to an empty name.
    pub fn name(&self, code: i64) -> &'static str {
        self.names.get(&code).copied().unwrap_or("")
    }

    /// Entries in ascending code order.
    pub fn iter(&self) -> impl Iterator<Item = Category> + '_ {
        self.names
            .iter()
            .map(|(&code, &name)| Category { code, name })
    }
}
