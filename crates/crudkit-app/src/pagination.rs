// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub const DEFAULT_PAGE_SIZE: usize = 20;
// Pager window is `page - 4 .. page + 5`.
const PAGER_SPAN_BEFORE: usize = 4;
const PAGER_SPAN_AFTER: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub page_count: usize,
    pub page: usize,
    pub items: &'a [T],
}

pub fn page_count(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// Clamps a requested page into `0..page_count`; negative requests read as
/// the first page and requests past the end as the last.
pub fn clamp_page(requested: i64, page_count: usize) -> usize {
    let last = page_count.saturating_sub(1);
    usize::try_from(requested.max(0)).map_or(last, |page| page.min(last))
}

pub fn paginate<T>(items: &[T], requested: i64, page_size: usize) -> Page<'_, T> {
    let page_count = page_count(items.len(), page_size);
    let page = clamp_page(requested, page_count);
    let start = page.saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    Page {
        page_count,
        page,
        items: &items[start..end],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerControl {
    First,
    Gap,
    Page { index: usize, current: bool },
    Last(usize),
}

/// Pager buttons for `page` out of `page_count`. Empty when there is at
/// most one page.
pub fn pager_controls(page: usize, page_count: usize) -> Vec<PagerControl> {
    if page_count <= 1 {
        return Vec::new();
    }
    let page = page.min(page_count - 1);
    let start = page.saturating_sub(PAGER_SPAN_BEFORE);
    let end = page.saturating_add(PAGER_SPAN_AFTER).min(page_count);

    let mut controls = Vec::with_capacity(end - start + 4);
    if start > 0 {
        controls.push(PagerControl::First);
        if start > 1 {
            controls.push(PagerControl::Gap);
        }
    }
    controls.extend((start..end).map(|index| PagerControl::Page {
        index,
        current: index == page,
    }));
    if end < page_count {
        if end < page_count - 1 {
            controls.push(PagerControl::Gap);
        }
        controls.push(PagerControl::Last(page_count - 1));
    }
    controls
}
