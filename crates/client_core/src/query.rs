use shared::{domain::SortDirection, protocol::ClientesQuery};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct QueryKey {
    pub page: u32,
    pub search: String,
    pub sort: SortDirection,
}

impl QueryKey {
    pub fn new(page: u32, search: impl Into<String>, sort: SortDirection) -> Self {
        Self {
            page,
            search: search.into(),
            sort,
        }
    }

    /// `p{page}-s{search}-o{sort}`. The page prefix is digits only and the
    /// suffix is one of two fixed tokens, so distinct tuples never collide.
    pub fn cache_key(&self) -> String {
        cache_key(self.page, &self.search, self.sort)
    }

    pub fn to_request(&self) -> ClientesQuery {
        ClientesQuery::new(self.page, &self.search, self.sort)
    }
}

pub fn cache_key(page: u32, search: &str, sort: SortDirection) -> String {
    format!("p{page}-s{search}-o{sort}")
}
