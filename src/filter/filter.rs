use crate::config::FilterConfig;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{Condition, QueryPlan};

/// Turns decoded query pairs into a [`QueryPlan`]. Pure, no I/O.
pub fn translate(raw: &[(String, String)], config: &FilterConfig) -> Result<QueryPlan, FilterError> {
    let mut conditions = Vec::new();
    let mut select = None;
    let mut sort = None;
    let mut page = None;
    let mut limit = None;

    // `select`, `sort`, `page` and `limit` shape the plan; every other key is a filter.
    for (key, value) in raw {
        match key.as_str() {
            "select" => select = FilterOrder::parse_select(value)?,
            "sort" => sort = Some(FilterOrder::parse_sort(value)?),
            "page" => page = Some(value.as_str()),
            "limit" => limit = Some(value.as_str()),
            _ => conditions.push(FilterWhere::parse_pair(key, value)?),
        }
    }

    let page = positive(page).unwrap_or(1);
    let limit = cap_limit(positive(limit).unwrap_or(config.default_limit), config);

    if config.debug_logging {
        tracing::debug!(
            conditions = conditions.len(),
            page,
            limit,
            "translated query string"
        );
    }

    Ok(QueryPlan {
        conditions,
        sort: sort.unwrap_or_else(FilterOrder::default_sort),
        select,
        page,
        limit,
    })
}

fn positive(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .map(|n| n as u64)
}

fn cap_limit(limit: u64, config: &FilterConfig) -> u64 {
    match config.max_limit {
        Some(max) if limit > max => {
            if config.debug_logging {
                tracing::warn!("Limit {} exceeds max {}, capping to max", limit, max);
            }
            max
        }
        _ => limit,
    }
}

impl QueryPlan {
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::filter::types::{FilterOp, SortDirection, SortKey};
    use serde_json::json;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn config() -> FilterConfig {
        AppConfig::development().filter
    }

    #[test]
    fn reserved_keys_are_not_filters() {
        let plan = translate(
            &pairs(&[
                ("select", "name,description"),
                ("sort", "name"),
                ("page", "2"),
                ("limit", "5"),
                ("housing", "true"),
            ]),
            &config(),
        )
        .unwrap();

        assert_eq!(plan.conditions, vec![Condition::eq("housing", true)]);
        assert_eq!(plan.select, Some(vec!["name".to_string(), "description".to_string()]));
        assert_eq!(plan.sort, vec![SortKey::asc("name")]);
        assert_eq!((plan.page, plan.limit), (2, 5));
        assert_eq!(plan.skip(), 5);
    }

    #[test]
    fn defaults_apply_when_absent_or_invalid() {
        let plan = translate(&pairs(&[("page", "0"), ("limit", "abc")]), &config()).unwrap();
        assert_eq!(plan.page, 1);
        assert_eq!(plan.limit, 20);
        assert_eq!(plan.sort.len(), 1);
        assert_eq!(plan.sort[0].field, "createdAt");
        assert_eq!(plan.sort[0].direction, SortDirection::Desc);
        assert_eq!(plan.select, None);

        let plan = translate(&pairs(&[("page", "-4"), ("limit", "-1")]), &config()).unwrap();
        assert_eq!((plan.page, plan.limit), (1, 20));
    }

    #[test]
    fn huge_page_skip_saturates() {
        let plan = translate(&pairs(&[("page", "9223372036854775807"), ("limit", "20")]), &config()).unwrap();
        assert_eq!(plan.page, i64::MAX as u64);
        assert_eq!(plan.skip(), u64::MAX);
    }

    #[test]
    fn limit_is_capped() {
        let mut config = config();
        config.max_limit = Some(50);
        let plan = translate(&pairs(&[("limit", "500")]), &config).unwrap();
        assert_eq!(plan.limit, 50);
    }

    #[test]
    fn comparison_filters() {
        let plan = translate(
            &pairs(&[("averageCost[gte]", "5000"), ("averageCost[lt]", "10000")]),
            &config(),
        )
        .unwrap();
        assert_eq!(plan.conditions.len(), 2);
        assert_eq!(plan.conditions[0].op, FilterOp::Gte);
        assert_eq!(plan.conditions[1].value, json!(10000));
    }

    #[test]
    fn unknown_operator_is_rejected() {
        let err = translate(&pairs(&[("averageCost[where]", "1")]), &config()).unwrap_err();
        assert!(matches!(err, FilterError::UnsupportedOperator(_)));
    }
}
