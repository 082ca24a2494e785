//! Product list filters.
//!
//! The same filter set is sent to `/api/products` as query parameters and can
//! be re-applied locally to an already loaded list (servers that ignore the
//! parameters still yield a filtered view). Sorting and paging are local only
//! and never sent.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use stockdesk_core::{CategoryId, DomainError, SupplierId};

use crate::Product;

/// Rows per page when no limit is given.
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Name,
    UnitPrice,
    AvailableQuantity,
    CreatedAt,
}

impl FromStr for SortField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "price" | "unitprice" => Ok(Self::UnitPrice),
            "quantity" | "availablequantity" => Ok(Self::AvailableQuantity),
            "created" | "createdat" => Ok(Self::CreatedAt),
            other => Err(DomainError::validation(
                "sortBy",
                format!("unknown sort field `{other}` (name, price, quantity, created)"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(DomainError::validation(
                "sortOrder",
                format!("unknown sort order `{other}` (asc, desc)"),
            )),
        }
    }
}

/// One page of a longer list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    /// Number of items across all pages.
    pub total: usize,
    /// 1-based page actually shown.
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

/// Cut `items` into pages of `limit` and return page `page` (1-based).
///
/// A zero limit counts as 1. Page 0 is the first page and a page past the
/// end is the last one, so a non-empty list never yields an empty page.
/// An empty list has one empty page.
pub fn paginate<T>(items: Vec<T>, page: usize, limit: usize) -> Paginated<T> {
    let limit = limit.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(limit).max(1);
    let page = page.clamp(1, total_pages);
    let items = items.into_iter().skip((page - 1) * limit).take(limit).collect();
    Paginated {
        items,
        total,
        page,
        limit,
        total_pages,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<SupplierId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
    /// 1-based; unset is the first page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    /// Unset is [`DEFAULT_PAGE_SIZE`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl ProductFilters {
    /// Blank search text counts as unset.
    fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// No server-side filter is set. Sorting and paging do not count.
    pub fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }

    /// Query parameters for the set filter fields, in a stable order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        if let Some(id) = self.category_id {
            pairs.push(("categoryId", id.to_string()));
        }
        if let Some(id) = &self.supplier_id {
            pairs.push(("supplierId", id.to_string()));
        }
        if let Some(v) = self.min_price {
            pairs.push(("minPrice", v.to_string()));
        }
        if let Some(v) = self.max_price {
            pairs.push(("maxPrice", v.to_string()));
        }
        if let Some(v) = self.min_quantity {
            pairs.push(("minQuantity", v.to_string()));
        }
        if let Some(v) = self.max_quantity {
            pairs.push(("maxQuantity", v.to_string()));
        }
        pairs
    }

    /// Whether `product` passes every set filter. Search is a case-insensitive
    /// substring match on name or description; bounds are inclusive.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(term) = self.search_term() {
            let hit = product.name.to_lowercase().contains(&term)
                || product.description.to_lowercase().contains(&term);
            if !hit {
                return false;
            }
        }
        if self.category_id.is_some_and(|id| product.category.id != id) {
            return false;
        }
        if self.supplier_id.as_ref().is_some_and(|id| &product.supplier.id != id) {
            return false;
        }
        if self.min_price.is_some_and(|min| product.unit_price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.unit_price > max) {
            return false;
        }
        if self.min_quantity.is_some_and(|min| product.available_quantity < min) {
            return false;
        }
        if self.max_quantity.is_some_and(|max| product.available_quantity > max) {
            return false;
        }
        true
    }

    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        products.iter().filter(|p| self.matches(p)).collect()
    }

    /// Stable sort by the selected field; unsorted when none is selected.
    /// Names compare case-insensitively and products without a creation
    /// time sort first.
    pub fn sort(&self, products: &mut [&Product]) {
        let Some(field) = self.sort_by else {
            return;
        };
        let order = self.sort_order.unwrap_or_default();
        products.sort_by(|a, b| {
            let ord = compare_by(field, a, b);
            match order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
    }

    /// Filter, sort, then page a loaded list.
    pub fn view<'a>(&self, products: &'a [Product]) -> Paginated<&'a Product> {
        let mut shown = self.apply(products);
        self.sort(&mut shown);
        paginate(
            shown,
            self.page.unwrap_or(1),
            self.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }

    /// Replace these filters with `next`, going back to the first page when
    /// anything other than the page number changed.
    pub fn update(&mut self, next: ProductFilters) {
        let reset = without_page(&next) != without_page(self);
        *self = next;
        if reset {
            self.page = None;
        }
    }
}

fn without_page(filters: &ProductFilters) -> ProductFilters {
    ProductFilters {
        page: None,
        ..filters.clone()
    }
}

fn compare_by(field: SortField, a: &Product, b: &Product) -> Ordering {
    match field {
        SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortField::UnitPrice => a.unit_price.total_cmp(&b.unit_price),
        SortField::AvailableQuantity => a.available_quantity.cmp(&b.available_quantity),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::product::tests::sample;

    #[test]
    fn empty_filters_send_no_query() {
        let filters = ProductFilters {
            search: Some("   ".into()),
            ..Default::default()
        };
        assert!(filters.is_empty());
        assert!(filters.matches(&sample("p", 1, 1.0)));
    }

    #[test]
    fn query_pairs_use_api_names() {
        let filters = ProductFilters {
            search: Some(" drill ".into()),
            category_id: Some(CategoryId::new(3)),
            max_quantity: Some(10),
            ..Default::default()
        };
        assert_eq!(
            filters.query_pairs(),
            vec![
                ("search", "drill".to_string()),
                ("categoryId", "3".to_string()),
                ("maxQuantity", "10".to_string()),
            ]
        );
    }

    #[test]
    fn search_hits_name_or_description_case_insensitively() {
        let mut product = sample("p-1", 5, 3.0);
        product.name = "Cordless Drill".into();
        product.description = "18V battery".into();

        let by_name = ProductFilters { search: Some("DRILL".into()), ..Default::default() };
        let by_desc = ProductFilters { search: Some("battery".into()), ..Default::default() };
        let miss = ProductFilters { search: Some("hammer".into()), ..Default::default() };

        assert!(by_name.matches(&product));
        assert!(by_desc.matches(&product));
        assert!(!miss.matches(&product));
    }

    #[test]
    fn bounds_are_inclusive() {
        let products = vec![sample("a", 0, 1.0), sample("b", 10, 5.0), sample("c", 11, 9.5)];
        let filters = ProductFilters {
            min_price: Some(1.0),
            max_price: Some(5.0),
            max_quantity: Some(10),
            ..Default::default()
        };
        let ids: Vec<&str> = filters.apply(&products).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn supplier_filter() {
        let products = vec![sample("a", 1, 1.0)];
        let other = ProductFilters {
            supplier_id: Some(SupplierId::new("s-2").unwrap()),
            ..Default::default()
        };
        assert!(other.apply(&products).is_empty());
    }

    fn ids(page: &Paginated<&Product>) -> Vec<String> {
        page.items.iter().map(|p| p.id.as_str().to_string()).collect()
    }

    fn catalogue(n: usize) -> Vec<Product> {
        (1..=n).map(|i| sample(&format!("p{i:02}"), i as i64, i as f64)).collect()
    }

    #[test]
    fn sorting_and_paging_are_not_sent() {
        let filters = ProductFilters {
            sort_by: Some(SortField::UnitPrice),
            sort_order: Some(SortOrder::Desc),
            page: Some(2),
            limit: Some(5),
            ..Default::default()
        };
        assert!(filters.is_empty());
    }

    #[test]
    fn default_view_is_first_ten() {
        let products = catalogue(23);
        let page = ProductFilters::default().view(&products);
        assert_eq!(page.items.len(), DEFAULT_PAGE_SIZE);
        assert_eq!((page.page, page.total, page.total_pages), (1, 23, 3));
        assert_eq!(ids(&page)[0], "p01");
    }

    #[test]
    fn last_page_is_partial() {
        let products = catalogue(23);
        let filters = ProductFilters { page: Some(3), ..Default::default() };
        let page = filters.view(&products);
        assert_eq!(ids(&page), vec!["p21", "p22", "p23"]);
        assert_eq!(page.page, 3);
    }

    #[test]
    fn out_of_range_page_shows_the_last_page() {
        let products = catalogue(23);
        let past_end = ProductFilters { page: Some(9), ..Default::default() }.view(&products);
        assert_eq!(past_end.page, 3);
        assert_eq!(ids(&past_end), vec!["p21", "p22", "p23"]);

        let zero = ProductFilters { page: Some(0), ..Default::default() }.view(&products);
        assert_eq!(zero.page, 1);
    }

    #[test]
    fn empty_list_has_one_empty_page() {
        let page = paginate(Vec::<u8>::new(), 4, 10);
        assert!(page.items.is_empty());
        assert_eq!((page.page, page.total, page.total_pages), (1, 0, 1));
    }

    #[test]
    fn zero_limit_counts_as_one() {
        let page = paginate(vec!['a', 'b'], 2, 0);
        assert_eq!(page.items, vec!['b']);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn sort_applies_before_paging() {
        let products = catalogue(12);
        let filters = ProductFilters {
            sort_by: Some(SortField::UnitPrice),
            sort_order: Some(SortOrder::Desc),
            limit: Some(5),
            ..Default::default()
        };
        let page = filters.view(&products);
        assert_eq!(ids(&page), vec!["p12", "p11", "p10", "p09", "p08"]);
    }

    #[test]
    fn name_sort_ignores_case_and_keeps_ties_in_order() {
        let mut products = vec![sample("1", 1, 1.0), sample("2", 1, 1.0), sample("3", 1, 1.0)];
        products[0].name = "bolt".into();
        products[1].name = "Anchor".into();
        products[2].name = "BOLT".into();
        let filters = ProductFilters { sort_by: Some(SortField::Name), ..Default::default() };
        let mut shown = filters.apply(&products);
        filters.sort(&mut shown);
        let order: Vec<&str> = shown.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(order, vec!["2", "1", "3"]);
    }

    #[test]
    fn sort_keys_parse_from_cli_spellings() {
        assert_eq!("price".parse::<SortField>().unwrap(), SortField::UnitPrice);
        assert_eq!("availableQuantity".parse::<SortField>().unwrap(), SortField::AvailableQuantity);
        assert_eq!("DESC".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        let err = "colour".parse::<SortField>().unwrap_err();
        assert!(err.field_errors().unwrap().get("sortBy").is_some());
    }

    #[test]
    fn changing_filters_resets_the_page() {
        let mut current = ProductFilters { page: Some(3), ..Default::default() };

        current.update(ProductFilters { page: Some(4), ..current.clone() });
        assert_eq!(current.page, Some(4));

        current.update(ProductFilters { search: Some("drill".into()), ..current.clone() });
        assert_eq!(current.page, None);
        assert_eq!(current.search.as_deref(), Some("drill"));

        current.update(ProductFilters { sort_by: Some(SortField::Name), page: Some(2), ..current.clone() });
        assert_eq!(current.page, None);
    }

    proptest! {
        #[test]
        fn paging_partitions_the_list(len in 0usize..60, limit in 1usize..15) {
            let items: Vec<usize> = (0..len).collect();
            let pages = paginate(items.clone(), 1, limit).total_pages;
            let joined: Vec<usize> = (1..=pages).flat_map(|p| paginate(items.clone(), p, limit).items).collect();
            prop_assert_eq!(joined, items);
        }

        #[test]
        fn filtering_never_adds_products(qty in proptest::collection::vec(0i64..50, 0..20), min in 0i64..50) {
            let products: Vec<Product> = qty
                .iter()
                .enumerate()
                .map(|(i, q)| sample(&i.to_string(), *q, 1.0))
                .collect();
            let filters = ProductFilters { min_quantity: Some(min), ..Default::default() };
            let kept = filters.apply(&products);
            prop_assert!(kept.len() <= products.len());
            prop_assert!(kept.iter().all(|p| p.available_quantity >= min));
        }
    }
}