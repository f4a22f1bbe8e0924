//! Client-side list handling: every fetch returns the whole collection and
//! the views below slice, deduplicate and group it in memory.

use std::collections::{BTreeMap, HashSet};

use crate::config::{DEFAULT_PAGE_SIZE, MAX_VISIBLE_PAGES, PAGE_SIZES};
use crate::models::{Identified, User};

/// Accepts one of [`PAGE_SIZES`], anything else becomes the default.
pub fn page_size(requested: usize) -> usize {
    if PAGE_SIZES.contains(&requested) {
        requested
    } else {
        DEFAULT_PAGE_SIZE
    }
}

pub fn total_pages(len: usize, size: usize) -> usize {
    if size == 0 {
        return 0;
    }
    len.div_ceil(size)
}

/// Keeps `page` within `[1, max(total, 1)]`.
pub fn clamp_page(page: usize, total: usize) -> usize {
    page.clamp(1, total.max(1))
}

#[derive(Debug, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// 1-based, always valid for `total_pages`
    pub number: usize,
    pub size: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Page<'_, T> {
    pub fn has_prev(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    /// 1-based index of the first item shown, 0 when empty.
    pub fn first_index(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            (self.number - 1) * self.size + 1
        }
    }
}

pub fn paginate<T>(items: &[T], page: usize, size: usize) -> Page<'_, T> {
    let size = size.max(1);
    let total = total_pages(items.len(), size);
    let number = clamp_page(page, total);
    let start = ((number - 1) * size).min(items.len());
    let end = (start + size).min(items.len());
    Page {
        items: &items[start..end],
        number,
        size,
        total_pages: total,
        total_items: items.len(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Number(usize),
    Ellipsis,
}

/// Numbered links around `current`, at most [`MAX_VISIBLE_PAGES`] of them,
/// with the first and last page always reachable.
pub fn page_window(current: usize, total: usize) -> Vec<PageLink> {
    if total == 0 {
        return Vec::new();
    }
    let current = clamp_page(current, total);
    let mut start = current.saturating_sub(MAX_VISIBLE_PAGES / 2).max(1);
    let end = (start + MAX_VISIBLE_PAGES - 1).min(total);
    if end - start < MAX_VISIBLE_PAGES - 1 {
        start = (end + 1).saturating_sub(MAX_VISIBLE_PAGES).max(1);
    }

    let mut links = Vec::new();
    if start > 1 {
        links.push(PageLink::Number(1));
        if start > 2 {
            links.push(PageLink::Ellipsis);
        }
    }
    links.extend((start..=end).map(PageLink::Number));
    if end < total {
        if end < total - 1 {
            links.push(PageLink::Ellipsis);
        }
        links.push(PageLink::Number(total));
    }
    links
}

/// Drops repeated ids, keeping the first occurrence and the original order.
pub fn dedup_by_id<T: Identified>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.id().to_string()))
        .collect()
}

/// Buckets users by the upper-cased first character of their name. Keys come
/// out sorted; users keep their relative order inside a bucket.
pub fn group_by_initial(users: &[User]) -> BTreeMap<String, Vec<&User>> {
    let mut groups: BTreeMap<String, Vec<&User>> = BTreeMap::new();
    for user in users {
        let key = user
            .name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect::<String>())
            .unwrap_or_else(|| "#".to_string());
        groups.entry(key).or_default().push(user);
    }
    groups
}

/// Case-insensitive substring match on the name; a blank filter keeps all.
pub fn filter_by_name<'a>(users: &'a [User], needle: &str) -> Vec<&'a User> {
    let needle = needle.trim().to_lowercase();
    users
        .iter()
        .filter(|u| needle.is_empty() || u.name.to_lowercase().contains(&needle))
        .collect()
}
