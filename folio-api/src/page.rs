#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Page<T> {
    pub records: Vec<T>,
    #[serde(default)]
    pub total: i64,
    #[serde(default = "first_page")]
    pub page: i64,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub pages: i64,
}

fn first_page() -> i64 {
    1
}

impl<T> Page<T> {
    pub fn new(records: Vec<T>, total: i64, page: i64, size: i64) -> Page<T> {
        let pages = match size > 0 {
            true => (total + size - 1) / size,
            false => 0,
        };
        Page {
            records,
            total,
            page,
            size,
            pages,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Listing endpoints answer either with a page or, on older deployments, with a
/// bare array or an `items` object
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Page(Page<T>),
    Items { items: Vec<T> },
    List(Vec<T>),
}

impl<T> Listing<T> {
    pub fn into_page(self, page: i64, size: i64) -> Page<T> {
        match self {
            Listing::Page(p) => p,
            Listing::Items { items: records } | Listing::List(records) => {
                let total = records.len() as i64;
                Page::new(records, total, page, size)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_counts() {
        let p = Page::new(vec![1, 2, 3], 21, 2, 10);
        assert_eq!(p.pages, 3);
        assert!(p.has_next());
        assert!(p.has_previous());
        let p = Page::new(Vec::<u8>::new(), 0, 1, 0);
        assert_eq!(p.pages, 0);
        assert!(!p.has_next());
        assert!(!p.has_previous());
    }

    #[test]
    fn listing_shapes() {
        let l: Listing<u8> = serde_json::from_str("[1, 2]").unwrap();
        assert_eq!(l.into_page(1, 100).records, vec![1, 2]);
        let l: Listing<u8> = serde_json::from_str(r#"{"items": [3]}"#).unwrap();
        assert_eq!(l.into_page(1, 100).total, 1);
        let l: Listing<u8> =
            serde_json::from_str(r#"{"records": [4], "total": 9, "page": 2, "size": 1, "pages": 9}"#)
                .unwrap();
        let p = l.into_page(1, 100);
        assert_eq!((p.records, p.total, p.page), (vec![4], 9, 2));
    }
}
