//! Declaration-order route matching over the endpoint tree.
//!
//! [`find_action`] walks sibling endpoints in the order they were
//! configured. A node whose segments are a case-insensitive prefix of the
//! request either resolves an action for the request method (when the
//! path is fully consumed) or hands the remaining segments to its
//! children. The first action found wins; there is no specificity
//! scoring and segments are compared literally.

use super::segment::segment_eq;
use super::tree::{Action, EndpointNode, ANY_METHOD};

/// Something that can claim a prefix of a segmented request path.
pub trait Matchable {
    /// Returns the unmatched remainder when `self` is a prefix of `path`.
    fn match_prefix<'p>(&self, path: &'p [String]) -> Option<&'p [String]>;
}

/// Something that can accept or reject a request method.
pub trait Resolvable {
    fn matches_method(&self, method: &str) -> bool;
}

impl Matchable for EndpointNode {
    fn match_prefix<'p>(&self, path: &'p [String]) -> Option<&'p [String]> {
        let own = self.segments();
        if path.len() < own.len() {
            return None;
        }

        let (head, rest) = path.split_at(own.len());
        own.iter()
            .zip(head)
            .all(|(mine, theirs)| segment_eq(mine, theirs))
            .then_some(rest)
    }
}

impl Resolvable for Action {
    fn matches_method(&self, method: &str) -> bool {
        let configured = self.method.trim().to_uppercase();
        configured == ANY_METHOD || configured == method.trim().to_uppercase()
    }
}

/// Find the action answering `method` on `path` within `nodes`.
///
/// An empty `path` is treated as the root path `[""]`.
#[must_use]
pub fn find_action<'t>(method: &str, path: &[String], nodes: &'t [EndpointNode]) -> Option<&'t Action> {
    let root = [String::new()];
    let path = if path.is_empty() { &root[..] } else { path };
    walk(method, path, nodes)
}

fn walk<'t>(method: &str, path: &[String], nodes: &'t [EndpointNode]) -> Option<&'t Action> {
    for node in nodes {
        let Some(remaining) = node.match_prefix(path) else {
            continue;
        };

        let found = if remaining.is_empty() {
            resolve_action(method, &node.actions)
        } else {
            walk(method, remaining, &node.children)
        };

        if found.is_some() {
            return found;
        }
    }
    None
}

/// First action in declaration order accepting `method`.
#[must_use]
pub fn resolve_action<'a, A: Resolvable>(method: &str, actions: &'a [A]) -> Option<&'a A> {
    actions.iter().find(|action| action.matches_method(method))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::segment::segment;
    use crate::engine::tree::Response;

    fn action(method: &str, status: u16) -> Action {
        Action {
            method: method.into(),
            responses: vec![Response {
                status_code: status,
                ..Response::default()
            }],
            ..Action::default()
        }
    }

    fn node(path: &str, actions: Vec<Action>, children: Vec<EndpointNode>) -> EndpointNode {
        EndpointNode::new(Some(path), actions, children)
    }

    fn status(found: Option<&Action>) -> Option<u16> {
        found.map(|a| a.responses[0].status_code)
    }

    fn segs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn prefix_matching_returns_remainder() {
        let endpoint = node("/test//path", vec![], vec![]);
        let path = segs(&["test", "", "path", "foo"]);
        assert_eq!(endpoint.match_prefix(&path), Some(&path[3..]));

        let endpoint = node("match/REGARDLESS/of/CASE", vec![], vec![]);
        let path = segs(&["MATCH", "regardless", "OF", "case"]);
        assert_eq!(endpoint.match_prefix(&path).map(<[String]>::len), Some(0));
    }

    #[test]
    fn shorter_or_different_paths_do_not_match() {
        let endpoint = node("test/path", vec![], vec![]);
        assert!(endpoint.match_prefix(&segs(&["test"])).is_none());
        assert!(endpoint.match_prefix(&segs(&["path", "test"])).is_none());

        let endpoint = node("/test//path", vec![], vec![]);
        assert!(endpoint.match_prefix(&segs(&["test", "path"])).is_none());
    }

    #[test]
    fn any_method_matches_everything() {
        for configured in ["ANY", "any", "AnY", "  ANY   ", "   any     "] {
            let a = action(configured, 200);
            for requested in ["", "GET", "post", "NONSTANDARD"] {
                assert!(a.matches_method(requested), "{configured:?} vs {requested:?}");
            }
        }
    }

    #[test]
    fn explicit_method_requires_equality() {
        let a = action(" get ", 200);
        assert!(a.matches_method("GET"));
        assert!(a.matches_method("get"));
        assert!(!a.matches_method("POST"));
    }

    #[test]
    fn first_matching_action_wins() {
        let actions = vec![action("POST", 201), action("ANY", 200), action("GET", 202)];
        assert_eq!(status(resolve_action("GET", &actions)), Some(200));
        assert_eq!(status(resolve_action("post", &actions)), Some(201));
    }

    #[test]
    fn nested_endpoint_resolves_through_children() {
        let tree = vec![node(
            "users",
            vec![action("GET", 200)],
            vec![node("me", vec![action("GET", 201)], vec![])],
        )];

        assert_eq!(status(find_action("GET", &segment(Some("/users")), &tree)), Some(200));
        assert_eq!(status(find_action("GET", &segment(Some("/USERS/Me/")), &tree)), Some(201));
        assert_eq!(find_action("GET", &segment(Some("/users/you")), &tree), None);
    }

    #[test]
    fn declaration_order_decides_between_siblings() {
        let tree = vec![
            node("a", vec![], vec![node("b", vec![action("ANY", 200)], vec![])]),
            node("a/b", vec![action("ANY", 201)], vec![]),
        ];
        assert_eq!(status(find_action("GET", &segment(Some("a/b")), &tree)), Some(200));

        let tree = vec![
            node("a/b", vec![action("ANY", 201)], vec![]),
            node("a", vec![], vec![node("b", vec![action("ANY", 200)], vec![])]),
        ];
        assert_eq!(status(find_action("GET", &segment(Some("a/b")), &tree)), Some(201));
    }

    #[test]
    fn later_siblings_are_tried_when_method_does_not_match() {
        let tree = vec![
            node("items", vec![action("POST", 201)], vec![]),
            node("items", vec![action("GET", 200)], vec![]),
        ];
        assert_eq!(status(find_action("GET", &segment(Some("items")), &tree)), Some(200));
        assert_eq!(find_action("DELETE", &segment(Some("items")), &tree), None);
    }

    #[test]
    fn root_path_matches_empty_endpoint() {
        let tree = vec![
            node("path", vec![action("ANY", 201)], vec![]),
            EndpointNode::new(None, vec![action("ANY", 200)], vec![]),
        ];
        assert_eq!(status(find_action("GET", &[], &tree)), Some(200));
        assert_eq!(status(find_action("GET", &segment(Some("/")), &tree)), Some(200));
    }

    #[test]
    fn literal_segments_only() {
        let tree = vec![node("users", vec![], vec![node(":id", vec![action("GET", 200)], vec![])])];
        assert_eq!(find_action("GET", &segment(Some("/users/42")), &tree), None);

        let tree = vec![node("users", vec![], vec![node("42", vec![action("GET", 200)], vec![])])];
        assert_eq!(status(find_action("GET", &segment(Some("/users/42")), &tree)), Some(200));
    }
}
