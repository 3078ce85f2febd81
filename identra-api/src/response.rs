/// Uniform response envelope and pagination metadata
///
/// Every HTTP response — success or failure — uses the same shape: a
/// status code echoed in the body, an optional message, an optional data
/// payload, and optional pagination metadata for list endpoints.
///
/// ```json
/// {
///   "status": 200,
///   "data": [ ... ],
///   "meta": { "page": 1, "per_page": 10, "total_pages": 4, "total_count": 37 }
/// }
/// ```

use serde::{Deserialize, Serialize};

/// Response envelope wrapping a payload of type `T`
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// HTTP status echoed in the body
    pub status: u16,

    /// Human-readable message, mostly for errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Pagination metadata for list endpoints
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl<T> Envelope<T> {
    /// 200 with a payload
    pub fn ok(data: T) -> Self {
        Self {
            status: 200,
            message: None,
            data: Some(data),
            meta: None,
        }
    }

    /// 200 with a payload and pagination metadata
    pub fn ok_with_meta(data: T, meta: Meta) -> Self {
        Self {
            status: 200,
            message: None,
            data: Some(data),
            meta: Some(meta),
        }
    }

    /// 201 with the created record
    pub fn created(data: T) -> Self {
        Self {
            status: 201,
            message: None,
            data: Some(data),
            meta: None,
        }
    }
}

impl Envelope<()> {
    /// 200 with no payload
    pub fn ok_empty() -> Self {
        Self {
            status: 200,
            message: None,
            data: None,
            meta: None,
        }
    }
}

/// Pagination metadata
///
/// Computed from the total match count and the requested page/limit, with
/// the configured default limit filling in when the request doesn't set
/// one. Page numbering is 1-based; out-of-range pages clamp to 1.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Meta {
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
    pub total_count: i64,
}

impl Meta {
    /// Builds metadata for a page request
    pub fn new(page: Option<i64>, limit: Option<i64>, total_count: i64, default_limit: i64) -> Self {
        let per_page = match limit {
            Some(l) if l > 0 => l,
            _ => default_limit,
        };

        let total_pages = if total_count == 0 {
            0
        } else {
            (total_count + per_page - 1) / per_page
        };

        let page = match page {
            Some(p) if p > 0 => p,
            _ => 1,
        };

        Self {
            page,
            per_page,
            total_pages,
            total_count,
        }
    }

    /// Row offset for the SQL query
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    /// Row limit for the SQL query
    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_defaults() {
        let meta = Meta::new(None, None, 37, 10);
        assert_eq!(meta.page, 1);
        assert_eq!(meta.per_page, 10);
        assert_eq!(meta.total_pages, 4);
        assert_eq!(meta.total_count, 37);
        assert_eq!(meta.offset(), 0);
        assert_eq!(meta.limit(), 10);
    }

    #[test]
    fn test_meta_second_page_offset() {
        let meta = Meta::new(Some(3), Some(5), 12, 10);
        assert_eq!(meta.offset(), 10);
        assert_eq!(meta.limit(), 5);
        assert_eq!(meta.total_pages, 3);
    }

    #[test]
    fn test_meta_exact_division() {
        let meta = Meta::new(Some(1), Some(10), 30, 10);
        assert_eq!(meta.total_pages, 3);
    }

    #[test]
    fn test_meta_empty_result() {
        let meta = Meta::new(None, None, 0, 10);
        assert_eq!(meta.total_pages, 0);
        assert_eq!(meta.page, 1);
    }

    #[test]
    fn test_meta_invalid_page_clamps_to_first() {
        let meta = Meta::new(Some(0), Some(-3), 10, 10);
        assert_eq!(meta.page, 1);
        assert_eq!(meta.per_page, 10);
    }

    #[test]
    fn test_envelope_skips_absent_fields() {
        let body = serde_json::to_string(&Envelope::ok("payload")).unwrap();
        assert!(!body.contains("message"));
        assert!(!body.contains("meta"));
        assert!(body.contains("payload"));

        let body = serde_json::to_string(&Envelope::<()>::ok_empty()).unwrap();
        assert_eq!(body, r#"{"status":200}"#);
    }
}
