//! Route table contracts.
//!
//! Route configuration and the controller CLI that populates it are out of
//! scope for this crate (see `spec.md` §1); what the decoder needs is just
//! the read-only shape of a route and a way to ask "what routes apply to
//! this `sourceRef`", which [`RouteTable`] supplies.

use http::HeaderMap;

/// A single entry in a route table: matched by `source_ref`, then by its
/// header matchers in order, first match wins.
#[derive(Clone, Debug)]
pub struct Route {
    /// The routing key this route is scoped to.
    pub source_ref: u64,
    /// Header predicates that must all match for this route to apply.
    pub header_matchers: Vec<HeaderMatcher>,
    /// The downstream target name to open a stream against.
    pub target: String,
    /// The routing key to present to the target.
    pub target_ref: u64,
}

impl Route {
    /// Returns true if every matcher on this route matches `headers`.
    pub fn matches(&self, headers: &HeaderMap) -> bool {
        self.header_matchers
            .iter()
            .all(|matcher| matcher.matches(headers))
    }
}

/// A single header predicate used by [`Route::matches`].
#[derive(Clone, Debug)]
pub struct HeaderMatcher {
    /// Lowercase header field name to look up.
    pub name: String,
    /// Exact value the header must have. `None` only requires presence.
    pub value: Option<String>,
}

impl HeaderMatcher {
    fn matches(&self, headers: &HeaderMap) -> bool {
        match headers.get(self.name.as_str()) {
            Some(actual) => match &self.value {
                Some(expected) => actual.as_bytes() == expected.as_bytes(),
                None => true,
            },
            None => false,
        }
    }
}

/// Supplies the ordered list of routes scoped to a `sourceRef`.
///
/// Implemented by the external route configuration collaborator; the
/// decoder only ever calls `supply_routes` and takes the first matching
/// entry.
pub trait RouteTable {
    /// Returns the routes configured for `source_ref`, in priority order.
    fn supply_routes(&self, source_ref: u64) -> &[Route];

    /// Returns the first route among `supply_routes(source_ref)` whose
    /// header matchers all match `headers`.
    fn select(&self, source_ref: u64, headers: &HeaderMap) -> Option<&Route> {
        self.supply_routes(source_ref)
            .iter()
            .find(|route| route.matches(headers))
    }
}
