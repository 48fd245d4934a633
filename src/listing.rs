//! Search and pagination for dashboard tables.

use crate::api::{Cabinet, Feedback, News, Procedure, Registration, Room, Shift, User};

/// Rows per table page.
pub const PAGE_SIZE: usize = 10;

/// Text fields a table row can be found by.
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;
}

/// Rows where any field contains `query`, ignoring case. A blank query
/// keeps every row.
pub fn search<'a, T: Searchable>(items: &'a [T], query: &str) -> Vec<&'a T> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return items.iter().collect();
    }
    items
        .iter()
        .filter(|item| {
            item.search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}

#[derive(Debug, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// 1-based
    pub number: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// Slice out page `number` (1-based). Out-of-range numbers are clamped to
/// the nearest existing page.
pub fn paginate<T>(items: &[T], number: usize, size: usize) -> Page<'_, T> {
    let size = size.max(1);
    let total_pages = items.len().div_ceil(size);
    let number = number.clamp(1, total_pages.max(1));
    let start = ((number - 1) * size).min(items.len());
    let end = (start + size).min(items.len());

    Page {
        items: &items[start..end],
        number,
        total_pages,
        total_items: items.len(),
    }
}

impl Searchable for User {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.full_name.as_str(), self.email.as_str(), self.login.as_str()];
        fields.extend(self.phone.as_deref());
        fields
    }
}

impl Searchable for Shift {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.description.as_deref());
        fields
    }
}

impl Searchable for Room {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.number.as_str()];
        fields.extend(self.description.as_deref());
        fields
    }
}

impl Searchable for Cabinet {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.number.as_str(), self.name.as_str()]
    }
}

impl Searchable for Procedure {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.cabinet_number.as_deref());
        fields.extend(self.cabinet_name.as_deref());
        fields
    }
}

impl Searchable for News {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.content.as_str()]
    }
}

impl Searchable for Feedback {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.message.as_str()];
        fields.extend(self.user_full_name.as_deref());
        fields
    }
}

impl Searchable for Registration {
    fn search_fields(&self) -> Vec<&str> {
        [
            self.user_full_name.as_deref(),
            self.user_email.as_deref(),
            self.user_phone.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}
