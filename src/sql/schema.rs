use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::comparator::{Comparator, ComparatorFamily};

/// The tables a request may reference. Everything except `video` is a relation of a video
/// and is only brought into a query when referenced.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Table {
    Video,
    Channel,
    Files,
    Playlist,
    Tag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ColumnKind {
    Text,
    Integer,
    Boolean,
    Timestamp,
    TextArray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub kind: ColumnKind,
}

const fn column(name: &'static str, kind: ColumnKind) -> ColumnDef {
    ColumnDef { name, kind }
}

const VIDEO_COLUMNS: &[ColumnDef] = &[
    column("id", ColumnKind::Integer),
    column("site", ColumnKind::Integer),
    column("video_id", ColumnKind::Text),
    column("title", ColumnKind::Text),
    column("description", ColumnKind::Text),
    column("published_at", ColumnKind::Timestamp),
    column("deleted", ColumnKind::Boolean),
    column("deleted_at", ColumnKind::Timestamp),
    column("alternative", ColumnKind::Text),
    column("thumbnail", ColumnKind::Text),
    column("download_format", ColumnKind::Text),
    column("downloaded_filename", ColumnKind::Text),
    column("downloaded_format", ColumnKind::Text),
    column("download", ColumnKind::Boolean),
    column("force_redownload", ColumnKind::Boolean),
    column("filesize", ColumnKind::Integer),
];

const CHANNEL_COLUMNS: &[ColumnDef] = &[
    column("channel_id", ColumnKind::Text),
    column("name", ColumnKind::Text),
    column("thumbnail", ColumnKind::Text),
];

const FILES_COLUMNS: &[ColumnDef] = &[
    column("thumbnail", ColumnKind::Text),
    column("audio_file", ColumnKind::Text),
    column("subtitles", ColumnKind::TextArray),
    column("total_filesize", ColumnKind::Integer),
];

const PLAYLIST_COLUMNS: &[ColumnDef] = &[
    column("name", ColumnKind::Text),
    column("playlist_id", ColumnKind::Text),
    column("id", ColumnKind::Integer),
];

const TAG_COLUMNS: &[ColumnDef] = &[column("tag", ColumnKind::Text)];

/// A many-to-many link table between `videos` and a relation's source table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Junction {
    pub table: &'static str,
    /// column referencing `videos.id`
    pub video_column: &'static str,
    /// column referencing the relation's primary key
    pub relation_column: &'static str,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Video => "video",
            Table::Channel => "channel",
            Table::Files => "files",
            Table::Playlist => "playlist",
            Table::Tag => "tag",
        }
    }
    /// The physical table this name is an alias of
    pub fn source_table(self) -> &'static str {
        match self {
            Table::Video => "videos",
            Table::Channel => "channels",
            Table::Files => "extra_video_files",
            Table::Playlist => "playlists",
            Table::Tag => "tags",
        }
    }
    pub fn columns(self) -> &'static [ColumnDef] {
        match self {
            Table::Video => VIDEO_COLUMNS,
            Table::Channel => CHANNEL_COLUMNS,
            Table::Files => FILES_COLUMNS,
            Table::Playlist => PLAYLIST_COLUMNS,
            Table::Tag => TAG_COLUMNS,
        }
    }
    pub fn column(self, name: &str) -> Option<ColumnRef> {
        self.columns()
            .iter()
            .find(|column| column.name == name)
            .map(|column| ColumnRef {
                table: self,
                column: column.name,
                kind: column.kind,
            })
    }
    pub fn junction(self) -> Option<Junction> {
        match self {
            Table::Video | Table::Files => None,
            Table::Channel => Some(Junction {
                table: "channelvideos",
                video_column: "video_id",
                relation_column: "channel_id",
            }),
            Table::Playlist => Some(Junction {
                table: "playlistvideos",
                video_column: "video_id",
                relation_column: "playlist_id",
            }),
            Table::Tag => Some(Junction {
                table: "videotags",
                video_column: "video_id",
                relation_column: "tag_id",
            }),
        }
    }
    /// Relations whose values are collections per video. Every column of these tables is
    /// aggregated into an array per video id.
    pub fn is_array_aggregated(self) -> bool {
        matches!(self, Table::Playlist | Table::Tag)
    }
}

/// A validated `(table, column)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    pub table: Table,
    pub column: &'static str,
    pub kind: ColumnKind,
}

impl ColumnRef {
    pub fn video_id() -> Self {
        Self {
            table: Table::Video,
            column: "id",
            kind: ColumnKind::Integer,
        }
    }
    pub fn is_array_aggregated(&self) -> bool {
        self.table.is_array_aggregated()
    }
    pub fn allows(&self, comparator: Comparator) -> bool {
        use Comparator as C;
        let family = comparator.spec().family;

        if self.is_array_aggregated() {
            return match comparator {
                C::ArrayEq | C::ArrayLike => self.kind == ColumnKind::Text,
                _ => family == ComparatorFamily::Array,
            };
        }

        match self.kind {
            ColumnKind::Text => {
                family == ComparatorFamily::Scalar || comparator == C::ArrayAny
            }
            ColumnKind::Integer => matches!(
                comparator,
                C::Eq | C::NotEq | C::Lt | C::LtEq | C::Gt | C::GtEq | C::ArrayAny
            ),
            ColumnKind::Boolean => family == ComparatorFamily::BooleanLiteral,
            ColumnKind::Timestamp => {
                matches!(
                    comparator,
                    C::Eq | C::NotEq | C::Lt | C::LtEq | C::Gt | C::GtEq
                ) || family == ComparatorFamily::DateBucket
            }
            ColumnKind::TextArray => false,
        }
    }
}

/// Column names of `table` in declaration order. Unknown tables have no columns.
pub fn columns_of(table: &str) -> Vec<&'static str> {
    Table::from_str(table)
        .map(|table| table.columns().iter().map(|column| column.name).collect())
        .unwrap_or_default()
}

pub fn is_valid_column(table: &str, column: &str) -> bool {
    Table::from_str(table)
        .ok()
        .and_then(|table| table.column(column))
        .is_some()
}

pub fn is_array_aggregated(table: &str, column: &str) -> bool {
    Table::from_str(table)
        .ok()
        .and_then(|table| table.column(column))
        .is_some_and(|column| column.is_array_aggregated())
}

pub fn is_comparator_allowed(column: &ColumnRef, comparator: Comparator) -> bool {
    column.allows(comparator)
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn columns_keep_declaration_order() {
        assert_eq!(columns_of("playlist"), vec!["name", "playlist_id", "id"]);
        assert_eq!(columns_of("tag"), vec!["tag"]);
        assert_eq!(columns_of("video").first(), Some(&"id"));
        assert_eq!(columns_of("video").len(), 16);
    }

    #[test]
    fn unknown_tables_have_no_columns() {
        assert!(columns_of("videos").is_empty());
        assert!(columns_of("").is_empty());
        assert!(!is_valid_column("users", "id"));
        assert!(!is_array_aggregated("users", "id"));
    }

    #[test]
    fn columns_are_checked_per_table() {
        assert!(is_valid_column("video", "title"));
        assert!(is_valid_column("files", "subtitles"));
        assert!(!is_valid_column("video", "not_a_column"));
        assert!(!is_valid_column("tag", "name"));
    }

    #[test]
    fn only_playlist_and_tag_columns_are_array_aggregated() {
        assert!(is_array_aggregated("playlist", "name"));
        assert!(is_array_aggregated("playlist", "playlist_id"));
        assert!(is_array_aggregated("tag", "tag"));
        assert!(!is_array_aggregated("channel", "name"));
        assert!(!is_array_aggregated("files", "subtitles"));
        assert!(!is_array_aggregated("video", "id"));
    }

    #[test]
    fn table_names_round_trip_through_strum() {
        for table in Table::iter() {
            assert_eq!(Table::from_str(table.name()).ok(), Some(table));
            assert_eq!(table.to_string(), table.name());
        }
    }

    #[test]
    fn every_relation_except_files_uses_a_junction() {
        assert!(Table::Video.junction().is_none());
        assert!(Table::Files.junction().is_none());
        assert_eq!(Table::Tag.junction().map(|j| j.table), Some("videotags"));
        assert_eq!(
            Table::Playlist.junction().map(|j| j.relation_column),
            Some("playlist_id")
        );
    }

    #[test]
    fn comparator_legality_follows_column_kind() {
        let title = Table::Video.column("title").unwrap();
        let id = Table::Video.column("id").unwrap();
        let deleted = Table::Video.column("deleted").unwrap();
        let published_at = Table::Video.column("published_at").unwrap();
        let tag = Table::Tag.column("tag").unwrap();
        let subtitles = Table::Files.column("subtitles").unwrap();

        assert!(is_comparator_allowed(&title, Comparator::ILike));
        assert!(is_comparator_allowed(&title, Comparator::ArrayAny));
        assert!(!is_comparator_allowed(&title, Comparator::At));
        assert!(!is_comparator_allowed(&title, Comparator::ArrayEq));

        assert!(is_comparator_allowed(&id, Comparator::GtEq));
        assert!(!is_comparator_allowed(&id, Comparator::ILike));

        assert!(is_comparator_allowed(&deleted, Comparator::True));
        assert!(!is_comparator_allowed(&deleted, Comparator::Eq));

        assert!(is_comparator_allowed(&published_at, Comparator::Before));
        assert!(is_comparator_allowed(&published_at, Comparator::Lt));
        assert!(!is_comparator_allowed(&published_at, Comparator::ILike));

        assert!(is_comparator_allowed(&tag, Comparator::ArrayLike));
        assert!(!is_comparator_allowed(&tag, Comparator::Eq));

        for comparator in Comparator::iter() {
            assert!(!is_comparator_allowed(&subtitles, comparator));
        }
    }

    #[test]
    fn text_array_comparators_need_text_columns() {
        let playlist_id = Table::Playlist.column("id").unwrap();
        let playlist_name = Table::Playlist.column("name").unwrap();

        assert!(!is_comparator_allowed(&playlist_id, Comparator::ArrayEq));
        assert!(!is_comparator_allowed(&playlist_id, Comparator::ArrayLike));
        assert!(is_comparator_allowed(&playlist_id, Comparator::ArrayAny));
        assert!(!is_comparator_allowed(&playlist_id, Comparator::Eq));

        assert!(is_comparator_allowed(&playlist_name, Comparator::ArrayEq));
        assert!(is_comparator_allowed(&playlist_name, Comparator::ArrayLike));
    }
}
