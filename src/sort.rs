use std::cmp::Ordering;

use crate::models::{FileEntry, SortBy, SortOrder};
use crate::utils::file_type_label;

/// Directories first, then the selected column, then direction.
pub fn compare_entries(a: &FileEntry, b: &FileEntry, sort_by: SortBy, sort_order: SortOrder) -> Ordering {
    match (a.is_dir, b.is_dir) {
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
    }

    let primary = match sort_by {
        SortBy::Name => compare_names(&a.name, &b.name),
        SortBy::Date => a.modified.cmp(&b.modified),
        SortBy::Size => a.size.cmp(&b.size),
        SortBy::Type => file_type_label(&a.extension, a.is_dir).cmp(&file_type_label(&b.extension, b.is_dir)),
    };

    match sort_order {
        SortOrder::Asc => primary,
        SortOrder::Desc => primary.reverse(),
    }
}

/// Case-insensitive natural ordering: "img_2" sorts before "img_10".
pub fn compare_names(a: &str, b: &str) -> Ordering {
    alphanumeric_sort::compare_str(a.to_lowercase(), b.to_lowercase())
}

pub fn sort_entries(entries: &[FileEntry], sort_by: SortBy, sort_order: SortOrder) -> Vec<FileEntry> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| compare_entries(a, b, sort_by, sort_order));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(entries: &[FileEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    fn listing() -> Vec<FileEntry> {
        vec![
            FileEntry::file(r"C:\d\img_10.png", 300, "2024-01-03 10:00"),
            FileEntry::dir(r"C:\d\Zeta", "2024-01-01 09:00"),
            FileEntry::file(r"C:\d\img_2.png", 100, "2024-01-05 10:00"),
            FileEntry::file(r"C:\d\Notes.txt", 200, "2024-01-04 10:00"),
            FileEntry::dir(r"C:\d\alpha", "2024-01-02 09:00"),
        ]
    }

    #[test]
    fn names_sort_naturally_with_directories_first() {
        let sorted = sort_entries(&listing(), SortBy::Name, SortOrder::Asc);
        assert_eq!(names(&sorted), vec!["alpha", "Zeta", "img_2.png", "img_10.png", "Notes.txt"]);
    }

    #[test]
    fn descending_keeps_directories_first() {
        let sorted = sort_entries(&listing(), SortBy::Name, SortOrder::Desc);
        assert_eq!(names(&sorted), vec!["Zeta", "alpha", "Notes.txt", "img_10.png", "img_2.png"]);
    }

    #[test]
    fn size_and_date_columns() {
        let by_size = sort_entries(&listing(), SortBy::Size, SortOrder::Asc);
        assert_eq!(&names(&by_size)[2..], &["img_2.png", "Notes.txt", "img_10.png"]);

        let by_date = sort_entries(&listing(), SortBy::Date, SortOrder::Desc);
        assert_eq!(names(&by_date), vec!["alpha", "Zeta", "img_2.png", "Notes.txt", "img_10.png"]);
    }

    #[test]
    fn type_column_uses_labels() {
        let sorted = sort_entries(&listing(), SortBy::Type, SortOrder::Asc);
        // "PNG Image" < "Text File"; equal labels keep listing order.
        assert_eq!(&names(&sorted)[2..], &["img_10.png", "img_2.png", "Notes.txt"]);
    }

    #[test]
    fn header_toggle() {
        assert_eq!(SortBy::Name.toggle(SortOrder::Asc, SortBy::Name), (SortBy::Name, SortOrder::Desc));
        assert_eq!(SortBy::Name.toggle(SortOrder::Desc, SortBy::Size), (SortBy::Size, SortOrder::Asc));
    }
}
