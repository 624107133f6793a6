use std::convert::Infallible;

use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest, Request};

/// Page selection pulled from `page` and `limit` query parameters.
/// Pages are 1-based; out-of-range values fall back to defaults.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PageState {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageState {
    fn default() -> Self {
        PageState { page: 1, limit: 10 }
    }
}

impl PageState {
    pub fn skip(&self) -> u64 {
        (self.page - 1) * self.limit
    }

    pub fn total_pages(&self, count: u64) -> u64 {
        (count + self.limit - 1) / self.limit
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for PageState {
    type Error = Infallible;

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let page: Option<u64> = request.query_value("page").and_then(|it| it.ok());
        let limit: Option<u64> = request.query_value("limit").and_then(|it| it.ok());

        let defaults = PageState::default();
        Outcome::Success(PageState {
            page: page.filter(|p| *p > 0).unwrap_or(defaults.page),
            limit: limit.filter(|l| *l > 0).unwrap_or(defaults.limit),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_is_zero_based() {
        let page = PageState { page: 2, limit: 10 };
        assert_eq!(page.skip(), 10);
        assert_eq!(PageState::default().skip(), 0);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = PageState { page: 1, limit: 10 };
        assert_eq!(page.total_pages(25), 3);
        assert_eq!(page.total_pages(30), 3);
        assert_eq!(page.total_pages(0), 0);
    }
}
