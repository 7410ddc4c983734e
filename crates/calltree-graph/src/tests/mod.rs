//! Unit tests for the calltree-graph crate.


mod builder_tests {
    use rstest::rstest;

    use super::support::{FailingSource, memory_source};
    use crate::{
        BlacklistFilter, BlacklistMode, BuildOptions, CallNode, DEPTH_CEILING, DepthLimit,
        ErrorKind, GraphError, MemoryTagSource, PatternSyntax, Reference, Symbol, Terminal,
        TreeBuilder,
    };

    fn build(source: MemoryTagSource, options: BuildOptions, root: &str) -> CallNode {
        TreeBuilder::new(source)
            .with_options(options)
            .build_tree(&Symbol::new(root))
            .expect("tree should build")
    }

    fn build_with_blacklist(
        source: MemoryTagSource,
        patterns: &[&str],
        mode: BlacklistMode,
        root: &str,
    ) -> CallNode {
        let blacklist =
            BlacklistFilter::new(patterns, PatternSyntax::Exact).expect("valid blacklist");
        TreeBuilder::new(source)
            .with_blacklist(blacklist)
            .with_options(BuildOptions::default().with_blacklist_mode(mode))
            .build_tree(&Symbol::new(root))
            .expect("tree should build")
    }

    fn child_names(node: &CallNode) -> Vec<&str> {
        node.children()
            .iter()
            .map(|child| child.symbol().as_str())
            .collect()
    }

    #[test]
    fn symbol_without_callers_is_single_exhausted_node() {
        let tree = build(MemoryTagSource::new(), BuildOptions::default(), "lonely");
        assert_eq!(tree.symbol().as_str(), "lonely");
        assert!(tree.is_leaf());
        assert_eq!(tree.terminal(), Some(Terminal::Exhausted));
        assert!(tree.reference().is_none());
    }

    #[test]
    fn mutual_recursion_ends_in_cycle_leaf() {
        let source = memory_source(&[("B", "A", 3), ("A", "B", 7)]);
        let tree = build(source, BuildOptions::default(), "A");

        let b = tree.child("B").expect("B calls A");
        assert_eq!(b.terminal(), None);
        let again = b.child("A").expect("A calls B");
        assert_eq!(again.terminal(), Some(Terminal::CycleDetected));
        assert!(again.is_leaf());
    }

    #[test]
    fn self_recursion_is_a_cycle() {
        let source = memory_source(&[("walk", "walk", 4)]);
        let tree = build(source, BuildOptions::default(), "walk");
        let child = tree.child("walk").expect("walk calls itself");
        assert_eq!(child.terminal(), Some(Terminal::CycleDetected));
    }

    #[test]
    fn depth_limit_cuts_chain() {
        let source = memory_source(&[("B", "A", 1), ("C", "B", 2), ("D", "C", 3)]);
        let options = BuildOptions::default().with_max_depth(DepthLimit::Edges(2));
        let tree = build(source, options, "A");

        let b = tree.child("B").expect("B at depth 1");
        assert_eq!(b.terminal(), None);
        let c = b.child("C").expect("C at depth 2");
        assert_eq!(c.terminal(), Some(Terminal::DepthLimit));
        assert!(c.child("D").is_none());
        assert_eq!(tree.height(), 2);
    }

    #[test]
    fn zero_depth_leaves_only_the_root() {
        let source = memory_source(&[("B", "A", 1)]);
        let options = BuildOptions::default().with_max_depth(DepthLimit::Edges(0));
        let tree = build(source, options, "A");
        assert_eq!(tree.terminal(), Some(Terminal::DepthLimit));
        assert!(tree.is_leaf());
    }

    #[test]
    fn unlimited_depth_stops_at_ceiling() {
        let names: Vec<String> = (0..=1000).map(|idx| format!("f{idx}")).collect();
        let mut source = MemoryTagSource::new();
        for (line, pair) in (1..).zip(names.windows(2)) {
            if let [callee, caller] = pair {
                source.add_call(caller.as_str(), callee.as_str(), Reference::new("deep.c", line));
            }
        }
        let tree = build(source, BuildOptions::default(), "f0");

        let ceiling = usize::try_from(DEPTH_CEILING).expect("ceiling fits usize");
        assert_eq!(tree.height(), ceiling);
        assert_eq!(tree.node_count(), ceiling + 1);
        let mut deepest = &tree;
        while let Some(next) = deepest.children().first() {
            deepest = next;
        }
        assert_eq!(deepest.terminal(), Some(Terminal::DepthLimit));
        assert_eq!(deepest.symbol().as_str(), "f900");
    }

    #[test]
    fn blacklisted_caller_and_subtree_are_omitted() {
        let source = memory_source(&[
            ("DEBUG", "target", 1),
            ("worker", "target", 2),
            ("debug_main", "DEBUG", 3),
        ]);
        let tree = build_with_blacklist(source, &["DEBUG"], BlacklistMode::Omit, "target");
        assert_eq!(child_names(&tree), ["worker"]);
        assert_eq!(tree.node_count(), 2);
    }

    #[test]
    fn blacklisted_root_is_still_expanded() {
        let source = memory_source(&[("caller", "DEBUG", 1)]);
        let tree = build_with_blacklist(source, &["DEBUG"], BlacklistMode::Omit, "DEBUG");
        assert_eq!(tree.symbol().as_str(), "DEBUG");
        assert_eq!(child_names(&tree), ["caller"]);
    }

    #[test]
    fn all_callers_blacklisted_exhausts_node() {
        let source = memory_source(&[("DEBUG", "target", 1), ("TRACE", "target", 2)]);
        let tree =
            build_with_blacklist(source, &["DEBUG", "TRACE"], BlacklistMode::Omit, "target");
        assert_eq!(tree.terminal(), Some(Terminal::Exhausted));
        assert!(tree.is_leaf());
    }

    #[test]
    fn mark_mode_keeps_blacklisted_leaves() {
        let source = memory_source(&[
            ("DEBUG", "target", 1),
            ("worker", "target", 2),
            ("debug_main", "DEBUG", 3),
        ]);
        let tree = build_with_blacklist(source, &["DEBUG"], BlacklistMode::Mark, "target");
        assert_eq!(child_names(&tree), ["DEBUG", "worker"]);
        let debug = tree.child("DEBUG").expect("marked leaf");
        assert_eq!(debug.terminal(), Some(Terminal::Blacklisted));
        assert!(debug.is_leaf());
    }

    #[test]
    fn regex_blacklist_filters_callers() {
        let source = memory_source(&[("DEBUG_LOG", "target", 1), ("worker", "target", 2)]);
        let blacklist =
            BlacklistFilter::new(["DEBUG_.*"], PatternSyntax::Regex).expect("valid blacklist");
        let tree = TreeBuilder::new(source)
            .with_blacklist(blacklist)
            .build_tree(&Symbol::new("target"))
            .expect("tree should build");
        assert_eq!(child_names(&tree), ["worker"]);
    }

    #[test]
    fn two_call_sites_give_two_children_with_positions() {
        let source = memory_source(&[("caller", "target", 10), ("caller", "target", 20)]);
        let options = BuildOptions::default().with_show_position(true);
        let tree = build(source, options, "target");

        let references: Vec<String> = tree
            .children()
            .iter()
            .filter_map(|child| child.reference().map(ToString::to_string))
            .collect();
        assert_eq!(references, ["src/main.c:10", "src/main.c:20"]);
        assert_eq!(child_names(&tree), ["caller", "caller"]);
    }

    #[test]
    fn identical_edges_are_deduplicated() {
        let source = memory_source(&[
            ("caller", "target", 10),
            ("other", "target", 11),
            ("caller", "target", 10),
        ]);
        let tree = build(source, BuildOptions::default(), "target");
        assert_eq!(child_names(&tree), ["caller", "other"]);
    }

    #[test]
    fn positions_are_hidden_by_default() {
        let source = memory_source(&[("caller", "target", 10)]);
        let tree = build(source, BuildOptions::default(), "target");
        let caller = tree.child("caller").expect("caller");
        assert!(caller.reference().is_none());
    }

    #[test]
    fn children_keep_backend_order() {
        let source = memory_source(&[
            ("zeta", "target", 1),
            ("alpha", "target", 2),
            ("mid", "target", 3),
        ]);
        let tree = build(source, BuildOptions::default(), "target");
        assert_eq!(child_names(&tree), ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn each_symbol_is_queried_once_per_forest() {
        let source = memory_source(&[
            ("shared", "left", 1),
            ("shared", "right", 2),
            ("top", "shared", 3),
        ]);
        let mut builder = TreeBuilder::new(source);
        let forest = builder
            .build_forest(&[Symbol::new("left"), Symbol::new("right")])
            .expect("forest should build");

        assert_eq!(forest.len(), 2);
        // left, right, shared, top
        assert_eq!(builder.source().query_count(), 4);
        let right = forest.tree("right").expect("right tree");
        assert_eq!(
            right.child("shared").and_then(|shared| shared.child("top")).map(CallNode::terminal),
            Some(Some(Terminal::Exhausted))
        );
    }

    #[test]
    fn collapse_repeats_marks_second_expansion() {
        let source = memory_source(&[
            ("shared", "left", 1),
            ("shared", "right", 2),
            ("top", "shared", 3),
        ]);
        let options = BuildOptions::default().with_collapse_repeats(true);
        let forest = TreeBuilder::new(source)
            .with_options(options)
            .build_forest(&[Symbol::new("left"), Symbol::new("right")])
            .expect("forest should build");

        let left = forest.tree("left").expect("left tree");
        assert!(left.child("shared").is_some_and(|shared| !shared.is_leaf()));
        let right = forest.tree("right").expect("right tree");
        let shared = right.child("shared").expect("shared under right");
        assert_eq!(shared.terminal(), Some(Terminal::Repeated));
    }

    #[test]
    fn forest_keeps_root_order() {
        let forest = TreeBuilder::new(MemoryTagSource::new())
            .build_forest(&[Symbol::new("b"), Symbol::new("a"), Symbol::new("c")])
            .expect("forest should build");
        let roots: Vec<&str> = forest
            .trees()
            .iter()
            .map(|tree| tree.symbol().as_str())
            .collect();
        assert_eq!(roots, ["b", "a", "c"]);
    }

    #[test]
    fn query_failure_names_the_symbol() {
        let source = FailingSource {
            inner: memory_source(&[("middle", "root", 1), ("bad", "middle", 2)]),
            failing: Symbol::new("bad"),
        };
        let err = TreeBuilder::new(source)
            .build_forest(&[Symbol::new("root")])
            .expect_err("forest should fail");

        assert!(matches!(&err, GraphError::Query { symbol, .. } if symbol.as_str() == "bad"));
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.to_string().contains("'bad'"));
    }

    #[rstest]
    #[case(-1, Some(DepthLimit::Unlimited))]
    #[case(0, Some(DepthLimit::Edges(0)))]
    #[case(2, Some(DepthLimit::Edges(2)))]
    #[case(900, Some(DepthLimit::Edges(900)))]
    #[case(901, None)]
    #[case(-2, None)]
    fn depth_requests_are_validated(#[case] requested: i64, #[case] expected: Option<DepthLimit>) {
        let result = DepthLimit::from_request(requested);
        match expected {
            Some(limit) => assert_eq!(result.ok(), Some(limit)),
            None => {
                let err = result.expect_err("out of range");
                assert_eq!(err.kind(), ErrorKind::Config);
            }
        }
    }

    #[test]
    fn unlimited_resolves_to_ceiling() {
        assert_eq!(DepthLimit::Unlimited.resolve(), DEPTH_CEILING);
        assert!(DepthLimit::edges(DEPTH_CEILING + 1).is_err());
    }
}

mod source_tests {
    use std::fs;

    use camino::Utf8PathBuf;
    use rusqlite::Connection;

    use super::support::{CscopeFixture, GlobalFixture, IO_C_XREF};
    use crate::{
        BackendKind, CallEdge, CscopeSource, ErrorKind, GlobalSource, GraphError, Symbol,
        TagSource,
    };

    fn summary(edges: &[CallEdge]) -> Vec<String> {
        edges
            .iter()
            .map(|edge| format!("{} {}", edge.caller(), edge.reference()))
            .collect()
    }

    #[test]
    fn global_resolves_enclosing_functions_and_macros() {
        let fixture = GlobalFixture::io_c();
        let root = fixture.write();
        let mut source = GlobalSource::open(&root).expect("open tag databases");
        assert_eq!(source.kind(), BackendKind::Global);

        let edges = source
            .find_callers(&Symbol::new("log_value"))
            .expect("query log_value");
        assert_eq!(summary(&edges), ["helper ./src/io.c:3", "TRACE ./src/io.c:6"]);

        let edges = source
            .find_callers(&Symbol::new("helper"))
            .expect("query helper");
        assert_eq!(summary(&edges), ["reader ./src/io.c:9", "reader ./src/io.c:10"]);
    }

    #[test]
    fn global_unknown_symbol_has_no_callers() {
        let fixture = GlobalFixture::io_c();
        let mut source = GlobalSource::open(fixture.write()).expect("open tag databases");
        let edges = source
            .find_callers(&Symbol::new("missing"))
            .expect("query missing");
        assert!(edges.is_empty());
    }

    #[test]
    fn global_reference_before_any_definition_is_skipped() {
        let mut fixture = GlobalFixture::new();
        let fid = fixture.file("a.c", "int x = f();\nint g(void) { return f(); }\n");
        fixture.define("g", &fid, 2, "int @n(void) { return f(); }");
        fixture.reference("f", &fid, "1,1");
        let mut source = GlobalSource::open(fixture.write()).expect("open tag databases");

        let edges = source.find_callers(&Symbol::new("f")).expect("query f");
        assert_eq!(summary(&edges), ["g a.c:2"]);
    }

    #[test]
    fn global_missing_database_is_unavailable() {
        let fixture = GlobalFixture::io_c();
        let root = fixture.write();
        fs::remove_file(root.join("GPATH")).expect("remove GPATH");

        let err = GlobalSource::open(&root).expect_err("GPATH missing");
        assert_eq!(err.kind(), ErrorKind::BackendUnavailable);
        assert!(err.to_string().contains("GPATH"));
    }

    #[test]
    fn global_btree_database_is_unavailable() {
        let fixture = GlobalFixture::io_c();
        let root = fixture.write();
        fs::write(root.join("GTAGS"), b"\x00\x06\x15\x61 not sqlite at all, just a b-tree header")
            .expect("overwrite GTAGS");

        let err = GlobalSource::open(&root).expect_err("GTAGS not sqlite");
        assert_eq!(err.kind(), ErrorKind::BackendUnavailable);
    }

    #[test]
    fn global_database_without_db_table_is_unavailable() {
        let fixture = GlobalFixture::io_c();
        let root = fixture.write();
        let path = root.join("GRTAGS");
        fs::remove_file(&path).expect("remove GRTAGS");
        let conn = Connection::open(&path).expect("create GRTAGS");
        conn.execute("CREATE TABLE other (x TEXT)", [])
            .expect("create table");
        drop(conn);

        let err = GlobalSource::open(&root).expect_err("no db table");
        assert!(matches!(err, GraphError::BackendUnavailable { .. }));
    }

    #[test]
    fn global_corrupt_line_list_is_a_parse_error() {
        let mut fixture = GlobalFixture::new();
        let fid = fixture.file("a.c", "void g(void) { f(); }\n");
        fixture.define("g", &fid, 1, "void @n(void) { f(); }");
        fixture.reference("f", &fid, "1,x");
        let mut source = GlobalSource::open(fixture.write()).expect("open tag databases");

        let err = source
            .find_callers(&Symbol::new("f"))
            .expect_err("bad line list");
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn cscope_resolves_enclosing_functions_and_macros() {
        let fixture = CscopeFixture::new();
        let path = fixture.write(IO_C_XREF);
        let mut source = CscopeSource::open(&path).expect("open cscope.out");
        assert_eq!(source.kind(), BackendKind::Cscope);

        let edges = source
            .find_callers(&Symbol::new("log_value"))
            .expect("query log_value");
        assert_eq!(summary(&edges), ["helper src/io.c:3", "TRACE src/io.c:6"]);

        let edges = source
            .find_callers(&Symbol::new("helper"))
            .expect("query helper");
        assert_eq!(summary(&edges), ["reader src/io.c:9", "reader src/io.c:10"]);
    }

    #[test]
    fn cscope_reads_names_as_cscope_stores_them() {
        let mut body = b"\t@src/io.c\n\n5 int\n\t$".to_vec();
        body.extend_from_slice(&[187, 97, 100, 148]);
        body.extend_from_slice(b"\n(void)\n\n7\n\t`");
        body.extend_from_slice(&[104, 150, 179, 114]);
        body.extend_from_slice(b"\n();\n\n8\n\t}\n\n\t@\n");
        let header_len = "cscope 15 /src/project 0000000000\n".len();
        let trailer = header_len + body.len();
        let mut contents = format!("cscope 15 /src/project {trailer:010}\n").into_bytes();
        contents.extend(body);
        contents.extend_from_slice(b"1\n.\n0\n1\nsrc/io.c\n");

        let fixture = CscopeFixture::new();
        let path = fixture.write_raw(&contents);
        let mut source = CscopeSource::open(&path).expect("open cscope.out");
        let edges = source
            .find_callers(&Symbol::new("helper"))
            .expect("query helper");
        assert_eq!(summary(&edges), ["reader src/io.c:7"]);
    }

    #[test]
    fn cscope_truncated_index_matches_long_queries() {
        let fixture = CscopeFixture::new();
        let body = "\t@fs/read_write.c\n\n480 ssize_t\n\t$new_sync\n(void)\n\n\
                    488 ret =\n\t`vfs_writ\n();\n\n490\n\t}\n\n\t@\n";
        let path = fixture.write_with_flags("-T ", body);
        let mut source = CscopeSource::open(&path).expect("open cscope.out");
        assert!(source.header().truncated);

        let edges = source
            .find_callers(&Symbol::new("vfs_write_iter"))
            .expect("query vfs_write_iter");
        assert_eq!(summary(&edges), ["new_sync fs/read_write.c:488"]);
        let edge = edges.first().expect("edge");
        assert_eq!(edge.callee().as_str(), "vfs_write_iter");
    }

    #[test]
    fn cscope_directory_resolves_default_file() {
        let fixture = CscopeFixture::new();
        fixture.write(IO_C_XREF);
        let source = CscopeSource::open(fixture.dir()).expect("open directory");
        assert_eq!(source.path().file_name(), Some("cscope.out"));
        assert_eq!(source.header().version, 15);
    }

    #[test]
    fn cscope_unknown_symbol_has_no_callers() {
        let fixture = CscopeFixture::new();
        let mut source = CscopeSource::open(fixture.write(IO_C_XREF)).expect("open cscope.out");
        let edges = source
            .find_callers(&Symbol::new("missing"))
            .expect("query missing");
        assert!(edges.is_empty());
    }

    #[test]
    fn cscope_uncompressed_file_is_unsupported() {
        let fixture = CscopeFixture::new();
        let path = fixture.write_raw(b"cscope 15 /src/project -c 0000000040\n\t@\n");
        let err = CscopeSource::open(&path).expect_err("uncompressed");
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
    }

    #[test]
    fn cscope_foreign_file_is_unsupported() {
        let fixture = CscopeFixture::new();
        let path = fixture.write_raw(b"!_TAG_FILE_FORMAT\t2\n");
        let err = CscopeSource::open(&path).expect_err("not cscope");
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
    }

    #[test]
    fn cscope_trailer_past_end_is_a_parse_error() {
        let fixture = CscopeFixture::new();
        let path = fixture.write_raw(b"cscope 15 /src/project 0000099999\n\t@\n");
        let err = CscopeSource::open(&path).expect_err("bad trailer");
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn cscope_truncated_symbol_data_fails_the_query() {
        let fixture = CscopeFixture::new();
        let path = fixture.write("\t@src/io.c\n\n1 \n\t$f\n\n2 \n\t`g\n\n");
        let mut source = CscopeSource::open(&path).expect("open cscope.out");
        let err = source
            .find_callers(&Symbol::new("g"))
            .expect_err("no end marker");
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn cscope_missing_file_is_unavailable() {
        let err = CscopeSource::open(Utf8PathBuf::from("/nonexistent/cscope.out"))
            .expect_err("missing");
        assert_eq!(err.kind(), ErrorKind::BackendUnavailable);
    }
}

mod render_tests {
    use camino::Utf8PathBuf;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    use crate::{
        CallNode, Forest, HtmlRenderer, JsonRenderer, Reference, Renderer, Symbol, Terminal,
        TextRenderer,
    };

    fn leaf(name: &str, line: Option<u32>, terminal: Terminal) -> CallNode {
        CallNode::leaf(
            Symbol::new(name),
            line.map(|line| Reference::new("src/io.c", line)),
            terminal,
        )
    }

    #[fixture]
    fn forest() -> Forest {
        let mut inner = CallNode::new(Symbol::new("reader"), Some(Reference::new("src/io.c", 9)));
        inner.push_child(leaf("log_value", Some(2), Terminal::CycleDetected));
        inner.push_child(leaf("main", Some(30), Terminal::DepthLimit));

        let mut root = CallNode::new(Symbol::new("log_value"), None);
        root.push_child(inner);
        root.push_child(leaf("DEBUG<x>", Some(12), Terminal::Blacklisted));
        root.push_child(leaf("init", Some(40), Terminal::Exhausted));

        let second = leaf("lonely", None, Terminal::Exhausted);
        Forest::new(vec![root, second])
    }

    #[rstest]
    fn text_draws_connectors_and_markers(forest: Forest) {
        let text = TextRenderer::new()
            .render_to_string(&forest)
            .expect("render text");
        let expected = "\
log_value
├── reader  src/io.c:9
│   ├── log_value  src/io.c:2 ↺
│   └── main  src/io.c:30 …
├── DEBUG<x>  src/io.c:12 ⊘
└── init  src/io.c:40

lonely
";
        assert_eq!(text, expected);
    }

    #[rstest]
    fn html_is_self_contained_and_escaped(forest: Forest) {
        let html = HtmlRenderer::new()
            .render_to_string(&forest)
            .expect("render html");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<style>"));
        assert!(html.contains("<title>Callers of log_value, lonely</title>"));
        assert!(html.contains("DEBUG&lt;x&gt;"));
        assert!(!html.contains("DEBUG<x>"));
        assert!(html.contains("<details open><summary>"));
        assert!(html.contains("<li class=\"leaf\" data-terminal=\"cycle-detected\">"));
    }

    #[rstest]
    fn text_and_html_encode_the_same_structure(forest: Forest) {
        let text = TextRenderer::new()
            .render_to_string(&forest)
            .expect("render text");
        let html = HtmlRenderer::new()
            .render_to_string(&forest)
            .expect("render html");

        let node_count: usize = forest.trees().iter().map(CallNode::node_count).sum();
        let text_nodes = text.lines().filter(|line| !line.is_empty()).count();
        let html_nodes = html.matches("<span class=\"symbol\">").count();
        assert_eq!(text_nodes, node_count);
        assert_eq!(html_nodes, node_count);

        for terminal in [
            Terminal::Exhausted,
            Terminal::DepthLimit,
            Terminal::CycleDetected,
            Terminal::Blacklisted,
            Terminal::Repeated,
        ] {
            let attribute = format!("data-terminal=\"{terminal}\">");
            let html_count = html.matches(&attribute).count();
            let tree_count = count_terminal(&forest, terminal);
            assert_eq!(html_count, tree_count, "{terminal} in html");
            if let Some(glyph) = terminal.glyph() {
                assert_eq!(text.matches(glyph).count(), tree_count, "{terminal} in text");
            }
        }
    }

    fn count_terminal(forest: &Forest, terminal: Terminal) -> usize {
        let mut stack: Vec<&CallNode> = forest.trees().iter().collect();
        let mut count = 0;
        while let Some(node) = stack.pop() {
            if node.terminal() == Some(terminal) {
                count += 1;
            }
            stack.extend(node.children());
        }
        count
    }

    #[rstest]
    fn json_carries_nodes_and_markers(forest: Forest) {
        let json = JsonRenderer::new()
            .render_to_string(&forest)
            .expect("render json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");

        let first = &value[0];
        assert_eq!(first["symbol"], "log_value");
        assert!(first.get("reference").is_none());
        assert_eq!(first["callers"][0]["reference"]["line"], 9);
        assert_eq!(first["callers"][0]["callers"][0]["terminal"], "cycle-detected");
        assert_eq!(value[1]["terminal"], "exhausted");
    }

    #[rstest]
    fn compact_json_is_one_line(forest: Forest) {
        let json = JsonRenderer::new()
            .with_pretty(false)
            .render_to_string(&forest)
            .expect("render json");
        assert_eq!(json.lines().count(), 1);
    }

    #[rstest]
    fn renders_to_file(forest: Forest) {
        let dir = TempDir::new().expect("temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("tree.txt")).expect("UTF-8 path");
        TextRenderer::new()
            .render_to_path(&forest, &path)
            .expect("render to file");
        let written = std::fs::read_to_string(&path).expect("read output");
        assert!(written.starts_with("log_value\n"));
    }
}
