pub const INDEX_HTML: &str = include_str!("../static/index.html");
pub const QUERY_HTML: &str = include_str!("../static/query.html");
pub const GRAPH_JS: &str = include_str!("../static/js/graph.js");
pub const QUERY_JS: &str = include_str!("../static/js/query.js");
pub const STYLE_CSS: &str = include_str!("../static/css/style.css");
