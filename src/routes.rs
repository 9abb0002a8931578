//! Route resolver: flatten the routing tree into concrete endpoints
//!
//! Depth-first, prefix-accumulating traversal: each subtree concatenates
//! its fragment onto the prefix, each leaf contributes its own pattern on
//! top. Handler classification follows a fixed precedence: resource
//! controller, then class-based per-verb dispatch, then plain function. A
//! leaf that cannot be resolved yields nothing; its siblings still do.

use crate::host::{ActionBinding, ClassSource, Handler, RouteNode, RouteTable, ViewClass};
use crate::locate::{locate, unwrap_callable};
use once_cell::sync::Lazy;
use regex::Regex;
use schemars::JsonSchema;
use serde::Serialize;

/// The recognized HTTP verb methods. Exactly this list: methods outside it
/// (protocol-level extras a type may implement) are never emitted.
pub const HTTP_METHODS: [&str; 7] = ["get", "post", "put", "patch", "delete", "head", "options"];

static METHOD_DEF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^def\s+(\w+)\s*\(").expect("method pattern"));

/// One flattened, externally reachable (path, verb) combination.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct Endpoint {
    /// Fully composed path pattern, prefix-concatenated through subtrees.
    pub pattern: String,

    /// Route's symbolic name; empty when unnamed.
    pub name: String,

    /// Handler's qualified identifier, `module.Name`.
    pub view: String,

    pub view_name: String,

    /// Human display label, e.g. `PostViewSet.list` or `SearchView.GET`.
    pub view_display: String,

    pub file: String,

    pub line: u32,

    /// `[line, 0]`: editor position, column always 0.
    pub pos: [u32; 2],

    /// HTTP verb, absent for non-verb-classified handlers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// Resource-controller action bound to the verb.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// Flatten the whole routing tree.
pub fn resolve(table: &dyn RouteTable) -> Vec<Endpoint> {
    scan(table.routes(), "")
}

fn scan(nodes: &[RouteNode], prefix: &str) -> Vec<Endpoint> {
    let mut endpoints = Vec::new();

    for node in nodes {
        match node {
            RouteNode::Include { pattern, routes } => {
                let nested = format!("{}{}", prefix, pattern);
                endpoints.extend(scan(routes, &nested));
            }
            RouteNode::Route { pattern, name, view } => {
                // Leaves without a bound handler are unreachable.
                let Some(handler) = view else { continue };
                let full = format!("{}{}", prefix, pattern);
                endpoints.extend(resolve_leaf(&full, name, handler));
            }
        }
    }

    endpoints
}

fn resolve_leaf(pattern: &str, name: &str, handler: &Handler) -> Vec<Endpoint> {
    match handler {
        Handler::ResourceController { class, actions } => {
            resolve_controller(pattern, name, class, actions)
        }
        Handler::ClassBased { class } => resolve_class_based(pattern, name, class),
        Handler::Function { callable } => {
            let unwrapped = unwrap_callable(callable);
            let Some(location) = locate(callable) else {
                return vec![];
            };
            vec![Endpoint {
                pattern: pattern.to_string(),
                name: name.to_string(),
                view: format!("{}.{}", unwrapped.module, unwrapped.name),
                view_name: unwrapped.name.clone(),
                view_display: unwrapped.name.clone(),
                file: location.file.clone(),
                line: location.line,
                pos: [location.line, 0],
                method: None,
                action: None,
            }]
        }
    }
}

/// One endpoint per (verb, action) binding. The action method's own line is
/// used only when the method is declared in the same file as the owning
/// type; inherited methods fall back to the type's declaration line.
fn resolve_controller(
    pattern: &str,
    name: &str,
    class: &ViewClass,
    actions: &[ActionBinding],
) -> Vec<Endpoint> {
    let Some(class_location) = &class.location else {
        return vec![];
    };

    actions
        .iter()
        .map(|binding| {
            let mut line = class_location.line;

            if let Some(method) = class.methods.get(&binding.action) {
                if let Some(location) = locate(method) {
                    if location.file == class_location.file {
                        line = location.line;
                    }
                }
            }

            Endpoint {
                pattern: pattern.to_string(),
                name: name.to_string(),
                view: class.qualified_name(),
                view_name: class.name.clone(),
                view_display: format!("{}.{}", class.name, binding.action),
                file: class_location.file.clone(),
                line,
                pos: [line, 0],
                method: Some(binding.method.clone()),
                action: Some(binding.action.clone()),
            }
        })
        .collect()
}

/// One endpoint per recognized verb method found in the class source; a
/// class exposing none gets a single endpoint at its own declaration line
/// with no verb.
fn resolve_class_based(pattern: &str, name: &str, class: &ViewClass) -> Vec<Endpoint> {
    let Some(class_location) = &class.location else {
        return vec![];
    };

    let verb_methods = scan_verb_methods(class.source.as_ref());

    if verb_methods.is_empty() {
        return vec![Endpoint {
            pattern: pattern.to_string(),
            name: name.to_string(),
            view: class.qualified_name(),
            view_name: class.name.clone(),
            view_display: class.name.clone(),
            file: class_location.file.clone(),
            line: class_location.line,
            pos: [class_location.line, 0],
            method: None,
            action: None,
        }];
    }

    verb_methods
        .into_iter()
        .map(|(verb, line)| Endpoint {
            pattern: pattern.to_string(),
            name: name.to_string(),
            view: class.qualified_name(),
            view_name: class.name.clone(),
            view_display: format!("{}.{}", class.name, verb.to_uppercase()),
            file: class_location.file.clone(),
            line,
            pos: [line, 0],
            method: Some(verb),
            action: None,
        })
        .collect()
}

/// Scan captured class source for `def <verb>(` definitions, keeping only
/// the fixed verb list. A redefined verb keeps its first position in the
/// result but takes the later line.
fn scan_verb_methods(source: Option<&ClassSource>) -> Vec<(String, u32)> {
    let Some(source) = source else {
        return vec![];
    };

    let mut found: Vec<(String, u32)> = Vec::new();

    for (index, raw_line) in source.lines.iter().enumerate() {
        let Some(captures) = METHOD_DEF.captures(raw_line.trim()) else {
            continue;
        };
        let method = &captures[1];
        if !HTTP_METHODS.contains(&method) {
            continue;
        }

        let line = source.start_line + index as u32;
        match found.iter_mut().find(|(name, _)| name == method) {
            Some(entry) => entry.1 = line,
            None => found.push((method.to_string(), line)),
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Callable, SourceLocation, Wrapper};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn location(file: &str, line: u32) -> SourceLocation {
        SourceLocation {
            file: file.into(),
            line,
        }
    }

    fn function(name: &str, line: u32) -> Callable {
        Callable {
            name: name.into(),
            module: "blog.views".into(),
            location: Some(location("/app/blog/views.py", line)),
            wraps: None,
        }
    }

    fn view_class(name: &str, line: u32, source_lines: &[&str]) -> ViewClass {
        ViewClass {
            name: name.into(),
            module: "blog.views".into(),
            location: Some(location("/app/blog/views.py", line)),
            source: Some(ClassSource {
                start_line: line,
                lines: source_lines.iter().map(|s| (*s).to_string()).collect(),
            }),
            methods: BTreeMap::new(),
        }
    }

    fn leaf(pattern: &str, name: &str, handler: Handler) -> RouteNode {
        RouteNode::Route {
            pattern: pattern.into(),
            name: name.into(),
            view: Some(handler),
        }
    }

    #[test]
    fn test_prefix_concatenation_through_nested_subtrees() {
        let tree = vec![RouteNode::Include {
            pattern: "api/".into(),
            routes: vec![RouteNode::Include {
                pattern: "posts/".into(),
                routes: vec![leaf(
                    "<slug>/",
                    "post_detail",
                    Handler::Function {
                        callable: function("post_detail", 42),
                    },
                )],
            }],
        }];

        let endpoints = scan(&tree, "");
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].pattern, "api/posts/<slug>/");
        assert_eq!(endpoints[0].name, "post_detail");
        assert_eq!(endpoints[0].view, "blog.views.post_detail");
        assert_eq!(endpoints[0].pos, [42, 0]);
        assert_eq!(endpoints[0].method, None);
    }

    #[test]
    fn test_controller_emits_one_endpoint_per_verb_action_pair() {
        let mut class = view_class("PostViewSet", 40, &[]);
        class.module = "blog.viewsets".into();
        class.methods.insert(
            "list".into(),
            Callable {
                module: "blog.viewsets".into(),
                ..function("list", 55)
            },
        );
        class.methods.insert(
            "create".into(),
            Callable {
                module: "blog.viewsets".into(),
                ..function("create", 70)
            },
        );

        let endpoints = resolve_leaf(
            "api/posts/",
            "post-list",
            &Handler::ResourceController {
                class,
                actions: vec![
                    ActionBinding {
                        method: "get".into(),
                        action: "list".into(),
                    },
                    ActionBinding {
                        method: "post".into(),
                        action: "create".into(),
                    },
                ],
            },
        );

        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[0].method.as_deref(), Some("get"));
        assert_eq!(endpoints[0].action.as_deref(), Some("list"));
        assert_eq!(endpoints[0].line, 55);
        assert_eq!(endpoints[0].view_display, "PostViewSet.list");
        assert_eq!(endpoints[1].method.as_deref(), Some("post"));
        assert_eq!(endpoints[1].action.as_deref(), Some("create"));
        assert_eq!(endpoints[1].line, 70);
    }

    #[test]
    fn test_controller_inherited_action_falls_back_to_class_line() {
        // `destroy` is inherited: its unwrapped location points at the
        // framework's file, not the class's own.
        let mut class = view_class("TagViewSet", 90, &[]);
        class.methods.insert(
            "destroy".into(),
            Callable {
                name: "destroy".into(),
                module: "rest_framework.mixins".into(),
                location: Some(location("/site-packages/rest_framework/mixins.py", 15)),
                wraps: None,
            },
        );

        let endpoints = resolve_leaf(
            "api/tags/<pk>/",
            "tag-detail",
            &Handler::ResourceController {
                class,
                actions: vec![ActionBinding {
                    method: "delete".into(),
                    action: "destroy".into(),
                }],
            },
        );

        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].line, 90);
        assert_eq!(endpoints[0].file, "/app/blog/views.py");
    }

    #[test]
    fn test_controller_missing_action_method_uses_class_line() {
        let class = view_class("CommentViewSet", 120, &[]);
        let endpoints = resolve_leaf(
            "api/comments/",
            "",
            &Handler::ResourceController {
                class,
                actions: vec![ActionBinding {
                    method: "get".into(),
                    action: "list".into(),
                }],
            },
        );
        assert_eq!(endpoints[0].line, 120);
    }

    #[test]
    fn test_class_based_verb_scan_boundary() {
        // trace/connect are real methods but outside the recognized list.
        let class = view_class(
            "DebugAPIView",
            20,
            &[
                "class DebugAPIView(APIView):",
                "    def get(self, request):",
                "        return Response({})",
                "    def trace(self, request):",
                "        return Response({})",
                "    def connect(self, request):",
                "        return Response({})",
            ],
        );

        let endpoints = resolve_leaf("debug/", "debug", &Handler::ClassBased { class });
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].method.as_deref(), Some("get"));
        assert_eq!(endpoints[0].view_display, "DebugAPIView.GET");
        assert_eq!(endpoints[0].line, 21);
    }

    #[test]
    fn test_class_based_multiple_verbs() {
        let class = view_class(
            "SearchView",
            100,
            &[
                "class SearchView(APIView):",
                "    def get(self, request):",
                "        ...",
                "    def post(self, request):",
                "        ...",
            ],
        );

        let endpoints = resolve_leaf("search/", "search", &Handler::ClassBased { class });
        let verbs: Vec<&str> = endpoints
            .iter()
            .map(|e| e.method.as_deref().unwrap())
            .collect();
        assert_eq!(verbs, vec!["get", "post"]);
        assert_eq!(endpoints[0].line, 101);
        assert_eq!(endpoints[1].line, 103);
    }

    #[test]
    fn test_class_based_without_verb_methods_emits_single_endpoint() {
        let class = view_class(
            "LegacyView",
            30,
            &["class LegacyView(View):", "    template_name = 'x.html'"],
        );

        let endpoints = resolve_leaf("legacy/", "", &Handler::ClassBased { class });
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].view_display, "LegacyView");
        assert_eq!(endpoints[0].line, 30);
        assert_eq!(endpoints[0].method, None);
    }

    #[test]
    fn test_class_based_without_source_falls_back_to_class_line() {
        let mut class = view_class("OpaqueView", 77, &[]);
        class.source = None;

        let endpoints = resolve_leaf("opaque/", "", &Handler::ClassBased { class });
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].line, 77);
    }

    #[test]
    fn test_function_behind_opaque_decorator_reports_wrapper() {
        // A decorator that lost identity metadata is itself the endpoint.
        let wrapped = Callable {
            name: "bad_decorator".into(),
            module: "blog.decorators".into(),
            location: Some(location("/app/blog/decorators.py", 5)),
            wraps: Some(Box::new(Wrapper {
                preserves_identity: false,
                inner: function("post_stats", 200),
            })),
        };

        let endpoints = resolve_leaf("stats/", "", &Handler::Function { callable: wrapped });
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].view_name, "bad_decorator");
        assert_eq!(endpoints[0].line, 5);
    }

    #[test]
    fn test_unlocatable_leaf_is_isolated() {
        let tree = vec![
            leaf(
                "native/",
                "",
                Handler::Function {
                    callable: Callable {
                        name: "native_handler".into(),
                        module: "ext".into(),
                        location: None,
                        wraps: None,
                    },
                },
            ),
            RouteNode::Route {
                pattern: "unbound/".into(),
                name: String::new(),
                view: None,
            },
            leaf(
                "ok/",
                "",
                Handler::Function {
                    callable: function("ok_handler", 9),
                },
            ),
        ];

        let endpoints = scan(&tree, "");
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].pattern, "ok/");
    }
}
