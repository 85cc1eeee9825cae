use super::error::FilterError;
use super::filter_where::validate_field;
use super::types::SortKey;

pub struct FilterOrder;

impl FilterOrder {
    /// Default ordering when the request names none: newest first.
    pub fn default_sort() -> Vec<SortKey> {
        vec![SortKey::desc("createdAt")]
    }

    /// `sort=-averageCost,name` → `[averageCost DESC, name ASC]`.
    pub fn parse_sort(spec: &str) -> Result<Vec<SortKey>, FilterError> {
        let mut out = Vec::new();
        for part in spec.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            let key = match trimmed.strip_prefix('-') {
                Some(field) => SortKey::desc(validate_field(field)?),
                None => SortKey::asc(validate_field(trimmed.trim_start_matches('+'))?),
            };
            out.push(key);
        }
        if out.is_empty() {
            return Ok(Self::default_sort());
        }
        Ok(out)
    }

    /// `select=name,description` → projection list. Empty segments are skipped.
    pub fn parse_select(spec: &str) -> Result<Option<Vec<String>>, FilterError> {
        let mut fields = Vec::new();
        for part in spec.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            fields.push(validate_field(trimmed)?.to_string());
        }
        Ok(if fields.is_empty() { None } else { Some(fields) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::types::SortDirection;

    #[test]
    fn parses_mixed_directions() {
        let keys = FilterOrder::parse_sort("-averageCost, name").unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].field, "averageCost");
        assert_eq!(keys[0].direction, SortDirection::Desc);
        assert_eq!(keys[1].field, "name");
        assert_eq!(keys[1].direction, SortDirection::Asc);
    }

    #[test]
    fn blank_sort_falls_back_to_newest_first() {
        assert_eq!(FilterOrder::parse_sort(" , ").unwrap(), FilterOrder::default_sort());
    }

    #[test]
    fn select_rejects_injection() {
        assert!(FilterOrder::parse_select("name;drop").is_err());
        assert_eq!(FilterOrder::parse_select("").unwrap(), None);
    }
}
