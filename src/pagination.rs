use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRef {
    pub page: u64,
    pub limit: u64,
}

/// Neighbouring pages, serialized as `{ previous?, next? }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<PageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationWindow {
    pub start_index: u64,
    pub end_index: u64,
    pub page: u64,
    pub limit: u64,
    pub links: PageLinks,
}

/// Window arithmetic over a filtered total. Never clamps: a page past the end
/// gets `previous` and no `next`. Indexes saturate for huge page numbers.
pub fn paginate(total: u64, page: u64, limit: u64) -> PaginationWindow {
    let page = page.max(1);
    let start_index = (page - 1).saturating_mul(limit);
    let end_index = page.saturating_mul(limit);

    let mut links = PageLinks::default();
    if start_index > 0 {
        links.previous = Some(PageRef { page: page - 1, limit });
    }
    if end_index < total {
        links.next = Some(PageRef { page: page + 1, limit });
    }

    PaginationWindow { start_index, end_index, page, limit, links }
}
